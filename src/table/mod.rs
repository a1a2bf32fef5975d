// src/table/mod.rs
use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

pub mod write;

pub use write::write_csv_atomic;

/// Column names of the combined output, in file order.
pub const OUTPUT_HEADERS: [&str; 3] = ["Years", "Number", "country"];

/// One row of the combined output.
///
/// Values are kept as the text the source carried so that a year label like
/// `2020` or `2019-2020` and a measurement like `150` or `1.5e3` round-trip
/// without reformatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Years")]
    pub years: String,
    #[serde(rename = "Number")]
    pub number: String,
    pub country: String,
}

/// Every row accumulated across runs, in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputTable {
    rows: Vec<Record>,
}

impl OutputTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a previously written output file.
    ///
    /// A missing or zero-length file means "no prior data". Any other file
    /// must carry the three output columns (in any order; extra columns are
    /// dropped).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no prior output");
            return Ok(Self::new());
        }
        let len = fs::metadata(path)
            .with_context(|| format!("reading metadata of {}", path.display()))?
            .len();
        if len == 0 {
            return Ok(Self::new());
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("opening prior output {}", path.display()))?;

        let headers = rdr
            .headers()
            .with_context(|| format!("reading header of {}", path.display()))?
            .clone();
        let missing: Vec<&str> = OUTPUT_HEADERS
            .iter()
            .copied()
            .filter(|h| !headers.iter().any(|c| c == *h))
            .collect();
        if !missing.is_empty() {
            bail!(
                "prior output {} is missing column(s) {}",
                path.display(),
                missing.join(", ")
            );
        }

        let mut rows = Vec::new();
        for (idx, result) in rdr.deserialize().enumerate() {
            let row: Record = result.with_context(|| {
                format!("CSV parse error in {} at record {}", path.display(), idx)
            })?;
            rows.push(row);
        }
        debug!(path = %path.display(), rows = rows.len(), "loaded prior output");
        Ok(Self { rows })
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        self.rows.extend(records);
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Overwrite `path` with the whole table.
    pub fn save(&self, path: &Path) -> Result<()> {
        let rows = self
            .rows
            .iter()
            .map(|r| [r.years.as_str(), r.number.as_str(), r.country.as_str()]);
        write_csv_atomic(path, &OUTPUT_HEADERS, rows)
    }
}
