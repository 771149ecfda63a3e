use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use wlanalyze::cli::{Cli, OutputFormat};
use wlanalyze::config::AnalyzerConfig;
use wlanalyze::model::{Model, SortOrder};
use wlanalyze::stats::SummaryTracker;
use wlanalyze::{csv_output, json_output, text_output, TraceParser};

/// Initialize tracing subscriber; `--debug` forces TRACE, otherwise RUST_LOG or warn
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read one trace, from stdin when the path is `-`
fn load_trace(parser: &TraceParser, path: &Path) -> Result<Model> {
    if path == Path::new("-") {
        let stdin = io::stdin();
        return parser
            .parse_reader(stdin.lock())
            .context("Failed to parse trace from stdin");
    }
    parser
        .parse_file(path)
        .with_context(|| format!("Failed to parse trace: {}", path.display()))
}

fn write_summary<W: Write>(model: &Model, format: OutputFormat, out: &mut W) -> Result<()> {
    let mut tracker = SummaryTracker::new();
    for (message, _) in model.rows() {
        tracker.record(message);
    }
    match format {
        OutputFormat::Text => tracker.write_summary(out)?,
        OutputFormat::Json => writeln!(out, "{}", json_output::summary_to_json(&tracker)?)?,
        OutputFormat::Csv => write!(out, "{}", csv_output::summary_to_csv(&tracker))?,
    }
    Ok(())
}

fn write_messages<W: Write>(model: &Model, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Text => text_output::write_messages(model, out)?,
        OutputFormat::Json => {
            writeln!(out, "{}", json_output::JsonOutput::from_model(model).to_json()?)?
        }
        OutputFormat::Csv => write!(out, "{}", csv_output::CsvOutput::from_model(model).to_csv())?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => AnalyzerConfig::from_toml(path)?,
        None => AnalyzerConfig::default(),
    };

    // Config filters first, then -e flags; all of them are ANDed
    let mut filter = config.base_filter()?;
    for expr in &args.filters {
        filter
            .add_expr(expr)
            .with_context(|| format!("Invalid filter expression: {}", expr))?;
    }

    let sort_key = match args.sort {
        Some(column) => {
            let order = if args.reverse {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            Some((column, order))
        }
        None => config.sort_key(),
    };
    let format = args.format.unwrap_or(config.format);

    let parser = TraceParser::new().with_parallelism(config.parallelism());
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let multiple = args.logfiles.len() > 1;
    for path in &args.logfiles {
        let mut model = load_trace(&parser, path)?;
        model.set_filter(Some(filter.clone()));
        if let Some((column, order)) = sort_key {
            model.sort(column, order);
        }

        if multiple && format == OutputFormat::Text {
            writeln!(out, "==> {} <==", path.display())?;
        }

        if args.summary {
            write_summary(&model, format, &mut out)?;
        } else {
            write_messages(&model, format, &mut out)?;
        }

        if args.stats && format == OutputFormat::Text {
            writeln!(out)?;
            text_output::write_delta_stats(&model.delta_stats(), &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
