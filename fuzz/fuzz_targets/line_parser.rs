#![no_main]

use libfuzzer_sys::fuzz_target;
use wlanalyze::TraceParser;

fuzz_target!(|data: &[u8]| {
    // Whole traces: parsing may fail on registry errors but must never panic
    if let Ok(mut model) = TraceParser::new().parse_reader(data) {
        model.sort(wlanalyze::Column::TimeDelta, wlanalyze::SortOrder::Descending);
        let _ = model.delta_stats();
    }
});
