// Integration tests: whole traces through TraceParser and the derived view

use std::path::PathBuf;
use wlanalyze::filter::MessageFilter;
use wlanalyze::model::{Column, SortOrder};
use wlanalyze::{Direction, ObjectRef, ParseError, RegistryError, TraceParser};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_client_trace_counts() {
    let model = TraceParser::new().parse_file(fixture("client.log")).unwrap();

    let stats = model.parse_stats();
    assert_eq!(stats.lines, 18);
    assert_eq!(stats.messages, 17);
    assert_eq!(stats.skipped, 1);
    assert_eq!(model.len(), 17);
    assert_eq!(model.row_count(), 17);
}

#[test]
fn test_client_trace_timestamps_and_lines() {
    let model = TraceParser::new().parse_file(fixture("client.log")).unwrap();

    let first = model.message(0).unwrap();
    assert_eq!(first.line, 1);
    assert_eq!(first.time, 3_712_345_101);
    assert_eq!(first.direction, Direction::ToCompositor);

    // The banner on line 12 is skipped but still counted
    let after_banner = model.message(11).unwrap();
    assert_eq!(after_banner.line, 13);
    assert_eq!(after_banner.method, "done");
    assert_eq!(after_banner.direction, Direction::FromCompositor);
}

#[test]
fn test_registry_bind_recovers_interface() {
    let model = TraceParser::new().parse_file(fixture("client.log")).unwrap();

    let bind = model.message(4).unwrap();
    assert_eq!(bind.method, "bind");
    assert_eq!(bind.created, vec![ObjectRef::new("wl_compositor", 4, 1)]);

    let create_surface = model.message(8).unwrap();
    assert_eq!(create_surface.object, ObjectRef::new("wl_compositor", 4, 1));
}

#[test]
fn test_reused_ids_get_new_generations() {
    let model = TraceParser::new().parse_file(fixture("client.log")).unwrap();

    // wl_callback#3 dies, then id 3 comes back as a surface
    let delete = model.message(7).unwrap();
    assert_eq!(delete.destroyed, vec![ObjectRef::new("wl_callback", 3, 1)]);
    assert_eq!(
        model.message(8).unwrap().created,
        vec![ObjectRef::new("wl_surface", 3, 1)]
    );

    // wl_callback#6 is created twice
    let frame_done: Vec<&ObjectRef> = model
        .messages()
        .iter()
        .filter(|m| m.object.class == "wl_callback" && m.method == "done" && m.object.instance == 6)
        .map(|m| &m.object)
        .collect();
    assert_eq!(
        frame_done,
        vec![
            &ObjectRef::new("wl_callback", 6, 1),
            &ObjectRef::new("wl_callback", 6, 2)
        ]
    );
}

#[test]
fn test_multi_connection_registries_are_independent() {
    let model = TraceParser::new()
        .parse_file(fixture("multi_connection.log"))
        .unwrap();

    assert_eq!(model.parse_stats().connections, vec!["client-a", "client-b"]);

    let a = model.message(0).unwrap();
    let b = model.message(1).unwrap();
    assert_eq!(a.connection, "client-a");
    assert_eq!(b.connection, "client-b");
    assert_eq!(a.queue, "Default Queue");
    // Same id on two connections is two first generations
    assert_eq!(a.created, vec![ObjectRef::new("wl_registry", 2, 1)]);
    assert_eq!(b.created, vec![ObjectRef::new("wl_registry", 2, 1)]);
}

#[test]
fn test_server_ids_are_retired_on_reuse() {
    let model = TraceParser::new()
        .parse_file(fixture("multi_connection.log"))
        .unwrap();

    let offers: Vec<&ObjectRef> = model
        .messages()
        .iter()
        .filter(|m| m.method == "data_offer")
        .flat_map(|m| &m.created)
        .collect();
    assert_eq!(
        offers,
        vec![
            &ObjectRef::new("wl_data_offer", 0xff00_0000, 1),
            &ObjectRef::new("wl_data_offer", 0xff00_0000, 2)
        ]
    );
}

#[test]
fn test_corrupt_trace_reports_line() {
    let err = TraceParser::new()
        .parse_file(fixture("corrupt.log"))
        .unwrap_err();

    match &err {
        ParseError::Line { line, source } => {
            assert_eq!(*line, 3);
            assert_eq!(*source, RegistryError::UnknownObject { instance: 5 });
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        err.to_string(),
        "Wayland log parse error at line 3: destroy for unknown object #5"
    );
}

#[test]
fn test_filter_then_sort_keeps_membership() {
    let mut model = TraceParser::new().parse_file(fixture("client.log")).unwrap();
    model.set_filter(Some(MessageFilter::from_expr("class=wl_surface").unwrap()));
    assert_eq!(model.row_count(), 4);

    model.sort(Column::Method, SortOrder::Ascending);
    let methods: Vec<&str> = model.rows().map(|(m, _)| m.method.as_str()).collect();
    assert_eq!(methods, vec!["commit", "commit", "frame", "frame"]);
    assert!(model.rows().all(|(m, _)| m.object.class == "wl_surface"));
}

#[test]
fn test_lifetime_filter() {
    let mut model = TraceParser::new().parse_file(fixture("client.log")).unwrap();
    model.set_filter(Some(MessageFilter::from_expr("lifetime=wl_callback").unwrap()));

    // sync and two frames create callbacks, three delete_id events retire them
    let lines: Vec<usize> = model.rows().map(|(m, _)| m.line).collect();
    assert_eq!(lines, vec![2, 8, 10, 14, 15, 18]);
}

#[test]
fn test_time_deltas_follow_view() {
    let mut model = TraceParser::new().parse_file(fixture("client.log")).unwrap();
    model.set_filter(Some(MessageFilter::from_expr("method=commit").unwrap()));

    let deltas = model.time_deltas();
    assert_eq!(deltas[0], 3_712_346_090);
    assert_eq!(deltas[1], 3_712_362_640 - 3_712_346_090);
}

#[test]
fn test_parse_stdin_style_reader() {
    let text = std::fs::read_to_string(fixture("client.log")).unwrap();
    let from_reader = TraceParser::new()
        .parse_reader(std::io::Cursor::new(text.as_bytes()))
        .unwrap();
    let from_file = TraceParser::new().parse_file(fixture("client.log")).unwrap();
    assert_eq!(from_reader.messages(), from_file.messages());
}
