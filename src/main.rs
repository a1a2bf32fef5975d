use anyhow::{Context, Result};
use clap::Parser;
use solar_combiner::{combine, logging, CombinerConfig, ConfigOverrides};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Append per-country solar CSV exports to the combined output table"
)]
struct Args {
    /// YAML file with input_dir, output_file, country_label, label_source, skip_lines
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    input_dir: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
    /// Label written to the `country` column of every new row
    #[arg(long)]
    country: Option<String>,
    /// Label rows with the file name (minus `.csv`) instead of --country
    #[arg(long)]
    label_from_filename: bool,
    /// Preamble lines before the header row of each export
    #[arg(long)]
    skip_lines: Option<usize>,
}

fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();

    let base = match &args.config {
        Some(path) => CombinerConfig::from_yaml_file(path)?,
        None => CombinerConfig::default(),
    };
    let cfg = base
        .with_overrides(ConfigOverrides {
            input_dir: args.input_dir,
            output_file: args.output,
            country_label: args.country,
            label_from_filename: args.label_from_filename,
            skip_lines: args.skip_lines,
        })
        .resolve()
        .context("resolving configuration")?;

    info!(
        input = %cfg.input_dir.display(),
        output = %cfg.output_file.display(),
        "combining"
    );
    let report = combine(&cfg)?;

    if !report.skipped.is_empty() {
        warn!(
            skipped = report.skipped.len(),
            of = report.files_seen,
            "some files were not combined"
        );
    }
    info!(
        combined = report.combined.len(),
        rows_added = report.rows_added,
        written = report.written,
        "done"
    );
    Ok(())
}
