//! Human-readable table output
//!
//! One row per visible message. The time delta column carries a small bar
//! whose length follows [`TimeDeltaStats::heat`].

use crate::message::Direction;
use crate::model::Model;
use crate::stats::TimeDeltaStats;
use std::io::{self, Write};

const HEAT_BAR_WIDTH: usize = 10;

/// Format microseconds as `seconds'milliseconds.microseconds`
///
/// ```
/// assert_eq!(wlanalyze::text_output::format_time(1_234_567), "1'234.567");
/// assert_eq!(wlanalyze::text_output::format_time(-5), "-0'000.005");
/// ```
pub fn format_time(micros: i64) -> String {
    let sign = if micros < 0 { "-" } else { "" };
    format!("{}{}", sign, format_micros(micros.unsigned_abs()))
}

/// Unsigned form of [`format_time`] for timestamps and delta magnitudes
pub fn format_micros(t: u64) -> String {
    format!("{}'{:03}.{:03}", t / 1_000_000, t / 1_000 % 1_000, t % 1_000)
}

/// Bar of `HEAT_BAR_WIDTH` cells filled in proportion to `heat`
pub fn heat_bar(heat: f64) -> String {
    let filled = (heat.clamp(0.0, 1.0) * HEAT_BAR_WIDTH as f64).round() as usize;
    format!(
        "{}{}",
        "█".repeat(filled),
        "·".repeat(HEAT_BAR_WIDTH - filled)
    )
}

fn direction_marker(direction: Direction) -> &'static str {
    match direction {
        Direction::ToCompositor => "->",
        Direction::FromCompositor => "<-",
        Direction::Unknown => "??",
    }
}

/// Write all visible rows of `model`
pub fn write_messages<W: Write>(model: &Model, out: &mut W) -> io::Result<()> {
    let stats = model.delta_stats();
    let show_connection = model.rows().any(|(m, _)| !m.connection.is_empty());
    let show_queue = model.rows().any(|(m, _)| !m.queue.is_empty());

    let object_width = model
        .rows()
        .map(|(m, _)| m.object.to_string().len() + m.object.generation.to_string().len() + 3)
        .max()
        .unwrap_or(0);

    for (message, delta) in model.rows() {
        write!(out, "{:>14} ", format_micros(message.time))?;
        if show_connection {
            write!(out, "<{}> ", message.connection)?;
        }
        if show_queue && !message.queue.is_empty() {
            write!(out, "{{{}}} ", message.queue)?;
        }
        let object = format!("{} [{}]", message.object, message.object.generation);
        writeln!(
            out,
            "{} {:<width$} {}({})  {:>14} {}",
            direction_marker(message.direction),
            object,
            message.method,
            message.arguments_text(),
            format_time(delta),
            heat_bar(stats.heat(delta)),
            width = object_width
        )?;
    }
    Ok(())
}

/// Write the time delta statistics block
pub fn write_delta_stats<W: Write>(stats: &TimeDeltaStats, out: &mut W) -> io::Result<()> {
    writeln!(out, "Time Δ smallest: {}", format_micros(stats.smallest))?;
    writeln!(out, "Time Δ median:   {}", format_micros(stats.median))?;
    writeln!(out, "Time Δ biggest:  {}", format_micros(stats.biggest))?;
    Ok(())
}
