//! CLI entry point for group statistics.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use group_stats::{RenderInput, RenderOptions, StatsPipeline, StatsReport};
use group_stats::record::MapRecord;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Per-group statistics over pre-grouped records",
    long_about = "Computes a statistics table (sums, category counts, distinct counts, \
                  coverage) for every group of a JSON render document.\n\n\
                  INPUT:\n  \
                  {\"properties\": [...], \"groups\": [...], \"settings\": {...}}\n\n\
                  EXAMPLES:\n  \
                  # Plain-text table\n  \
                  group-stats -i notes.json\n\n  \
                  # Override the grouping property and limit the rows\n  \
                  group-stats -i notes.json --group-by status --limit 10\n\n  \
                  # Per-group breakdown of one property\n  \
                  group-stats -i notes.json --breakdown owner\n\n  \
                  # Machine-readable report\n  \
                  group-stats -i notes.json --json"
)]
struct Args {
    /// Path to the JSON render document
    #[arg(short, long)]
    input: String,

    /// Grouping property, overriding the document's `groupBy` setting
    #[arg(short, long)]
    group_by: Option<String>,

    /// Maximum number of rows, overriding the document's `limit` setting
    #[arg(long)]
    limit: Option<usize>,

    /// Print the top values of this property for every row
    #[arg(short, long)]
    breakdown: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Output the serialized report as JSON instead of a table
    ///
    /// Disables all logging so stdout only carries the report.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber, writing to stderr.
fn init_logging(level: &str, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Apply command-line overrides on top of the document's settings.
fn pipeline_for(input: &RenderInput, args: &Args) -> StatsPipeline {
    let base = input.pipeline();
    let mut options = base.options().clone();
    if let Some(group_by) = &args.group_by {
        options.group_by = Some(group_by.clone());
    }
    if let Some(limit) = args.limit {
        options.max_groups = Some(limit);
    }
    debug!("Effective options: {:?}", options);

    StatsPipeline::builder()
        .options(rebuild(options))
        .config(base.config().clone())
        .build()
}

/// Run overridden options back through the builder so clamping applies.
fn rebuild(options: RenderOptions) -> RenderOptions {
    let mut builder = RenderOptions::builder()
        .ignore_nulls(options.ignore_nulls)
        .chart_top_n(options.chart_top_n)
        .show_chart_legends(options.show_chart_legends)
        .sample_limit(options.sample_limit)
        .column_cap(options.column_cap)
        .probe_top_n(options.probe_top_n);
    if let Some(group_by) = options.group_by {
        builder = builder.group_by(group_by);
    }
    if let Some(max) = options.max_groups {
        builder = builder.max_groups(max);
    }
    builder.build()
}

fn print_breakdowns(report: &StatsReport<'_, MapRecord>, property_id: &str) {
    println!();
    println!("Top values of {property_id}:");
    for row in &report.rows {
        let breakdown = report.breakdown(row, property_id);
        let tops: Vec<String> = breakdown
            .tops
            .iter()
            .map(|t| format!("{} ({})", t.label, t.count))
            .collect();
        let mut line = format!("  {}: {}", row.label, tops.join(", "));
        if !breakdown.others.is_empty() {
            line.push_str(&format!(", others ({})", breakdown.others_total()));
        }
        println!("{line}");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.json);

    if !std::path::Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let input = RenderInput::from_path(&args.input)
        .with_context(|| format!("Failed to load render input from {}", args.input))?;
    info!(
        "Loaded {} groups from {}",
        input.groups.len(),
        args.input
    );

    let pipeline = pipeline_for(&input, &args);
    let properties = input.display_properties();
    let report = pipeline.render(&properties, &input.groups);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
        return Ok(());
    }

    print!("{report}");
    if let Some(property_id) = &args.breakdown {
        print_breakdowns(&report, property_id);
    }
    Ok(())
}
