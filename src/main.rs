use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use movie_graph_prep::cli::{Cli, Command};
use movie_graph_prep::config::Config;
use movie_graph_prep::services::columns::{drop_columns, ColumnRemoval};
use movie_graph_prep::services::{run, Conversion, RunSummary};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.apply(Config::from_env().context("Failed to load config")?);

    match &cli.command {
        Command::Movies(_) => report_run(run(Conversion::Movies, &config)?, cli.json),
        Command::Ratings(_) => report_run(run(Conversion::Ratings, &config)?, cli.json),
        Command::DropColumns { columns, dry_run } => {
            let input = config
                .input_path
                .as_deref()
                .context("drop-columns needs --input or INPUT_PATH")?;
            let removal = drop_columns(input, columns, config.output_dir.as_deref(), *dry_run)
                .with_context(|| format!("Failed to clean {}", input.display()))?;
            report_removal(&removal, cli.json)
        }
    }
}

fn report_run(summary: RunSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let report = &summary.report;
    println!(
        "{} conversion {}: {} rows read, {} skipped",
        summary.conversion.name(),
        summary.run_id,
        report.rows_read,
        report.skipped_total()
    );
    for (reason, count) in &report.rows_skipped {
        println!("  skipped ({}): {}", reason, count);
    }
    for (reason, count) in &report.partial_skips {
        println!("  partial ({}): {}", reason, count);
    }
    if report.duplicates_dropped > 0 {
        println!("  duplicates dropped: {}", report.duplicates_dropped);
    }
    for path in &summary.outputs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rows = report.tables.get(&name).copied().unwrap_or_default();
        println!("  wrote {} ({} rows)", path.display(), rows);
    }
    Ok(())
}

fn report_removal(removal: &ColumnRemoval, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(removal)?);
        return Ok(());
    }

    let plan = &removal.plan;
    println!("Original columns ({}): {}", plan.original.len(), plan.original.join(", "));
    println!("Removed columns ({}): {}", plan.removed.len(), plan.removed.join(", "));
    println!("Remaining columns ({}): {}", plan.remaining.len(), plan.remaining.join(", "));
    match &removal.output {
        Some(path) => println!("Wrote {} rows to {}", removal.rows_written, path.display()),
        None => println!("Dry run, nothing written"),
    }
    Ok(())
}
