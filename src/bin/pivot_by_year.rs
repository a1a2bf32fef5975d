use anyhow::{Context, Result};
use clap::Parser;
use solar_combiner::{logging, pivot::YearPivot, table::OutputTable};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reshape the combined table into one row per country, one column per year"
)]
struct Args {
    /// Combined long-format CSV (Years,Number,country)
    #[arg(short, long)]
    input: PathBuf,
    /// Wide CSV to write (country,<year>,...)
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();
    anyhow::ensure!(
        args.input.exists(),
        "combined table {} does not exist",
        args.input.display()
    );

    let table = OutputTable::load(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let pivot = YearPivot::from_table(&table);
    pivot.save(&args.output)?;

    info!(
        rows = table.len(),
        years = pivot.years().len(),
        output = %args.output.display(),
        "wrote pivot"
    );
    Ok(())
}
