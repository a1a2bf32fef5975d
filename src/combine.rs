use anyhow::{Context, Result};
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};

use crate::{
    config::CombinerConfig,
    error::FileError,
    ingest::{list_csv_files, read_country_file},
    table::{OutputTable, Record},
};

/// What one combine pass did.
#[derive(Debug, Default)]
pub struct CombineReport {
    /// Candidate `.csv` files found in the input directory.
    pub files_seen: usize,
    /// Files whose rows were combined, with their row counts, in processing order.
    pub combined: Vec<(PathBuf, usize)>,
    /// Files that contributed nothing, and why.
    pub skipped: Vec<FileError>,
    pub prior_rows: usize,
    pub rows_added: usize,
    /// Labels attached to the new rows.
    pub countries: BTreeSet<String>,
    /// Whether the output file was rewritten.
    pub written: bool,
}

impl CombineReport {
    pub fn schema_skips(&self) -> impl Iterator<Item = &FileError> {
        self.skipped
            .iter()
            .filter(|e| matches!(e, FileError::Schema { .. }))
    }
}

/// Append every usable export in `cfg.input_dir` to `cfg.output_file`.
///
/// Files that fail to read or lack the required columns are logged and
/// skipped. The output is rewritten only if at least one file was usable;
/// otherwise it is left untouched. Rows are never deduplicated, so running
/// twice over the same input appends the same rows twice.
///
/// `cfg` is expected to be resolved (no `~` left in paths).
pub fn combine(cfg: &CombinerConfig) -> Result<CombineReport> {
    let mut report = CombineReport::default();

    let files = list_csv_files(&cfg.input_dir)?;
    let output_identity = identity(&cfg.output_file);

    let mut new_rows: Vec<Record> = Vec::new();
    for path in files {
        if output_identity.is_some() && identity(&path) == output_identity {
            info!(path = %path.display(), "skipping the output file itself");
            continue;
        }
        report.files_seen += 1;

        let name = display_name(&path);
        info!("Processing file: {}", name);

        let country = cfg.label_for(&path);
        match read_country_file(&path, cfg.skip_lines, &country) {
            Ok(rows) => {
                report.combined.push((path, rows.len()));
                report.countries.insert(country);
                new_rows.extend(rows);
            }
            Err(e @ FileError::Schema { .. }) => {
                warn!(file = %name, kind = e.kind(), "File {} does not contain 'Years' or 'Number' columns", name);
                report.skipped.push(e);
            }
            Err(e) => {
                error!(file = %name, kind = e.kind(), "Error processing file {}: {}", name, e);
                report.skipped.push(e);
            }
        }
    }

    if report.combined.is_empty() {
        info!("No new data to combine.");
        return Ok(report);
    }

    let mut table = OutputTable::load(&cfg.output_file)
        .with_context(|| format!("loading prior output {}", cfg.output_file.display()))?;
    report.prior_rows = table.len();
    report.rows_added = new_rows.len();
    table.extend(new_rows);
    table
        .save(&cfg.output_file)
        .with_context(|| format!("writing combined output {}", cfg.output_file.display()))?;
    report.written = true;

    info!(
        rows_added = report.rows_added,
        total_rows = table.len(),
        output = %cfg.output_file.display(),
        "wrote combined output"
    );
    let labels: Vec<&str> = report.countries.iter().map(String::as_str).collect();
    info!("New countries added: {}", labels.join(", "));

    Ok(report)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Canonical path, when the file exists.
fn identity(path: &Path) -> Option<PathBuf> {
    fs::canonicalize(path).ok()
}
