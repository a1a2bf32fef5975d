// src/ingest/mod.rs
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::{
    fs::{self, File},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use tracing::{debug, trace};

use crate::{error::FileError, table::Record};

/// Columns an export must carry to be combined.
pub const REQUIRED_COLUMNS: [&str; 2] = ["Years", "Number"];

/// List the `.csv` files directly inside `dir`, ordered by file name.
///
/// The suffix match is case-sensitive. Subdirectories and anything whose
/// name is not valid UTF-8 are ignored.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("listing input directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        let path = entry.path();
        let is_csv = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".csv"));
        if !is_csv {
            trace!(path = %path.display(), "not a csv, ignoring");
            continue;
        }
        if !path.is_file() {
            trace!(path = %path.display(), "not a regular file, ignoring");
            continue;
        }
        files.push(path);
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read one country export and return its rows labelled with `country`.
///
/// Layout: `skip_lines` lines of preamble, a header row, then data rows.
/// Only the `Years` and `Number` columns are kept; any others are dropped.
/// Rows shorter than the header read missing cells as empty; rows wider
/// than the header are a parse error.
#[tracing::instrument(level = "debug", skip(path, country), fields(path = %path.display()))]
pub fn read_country_file(
    path: &Path,
    skip_lines: usize,
    country: &str,
) -> Result<Vec<Record>, FileError> {
    let io_err = |source| FileError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);
    skip_preamble(&mut reader, skip_lines).map_err(io_err)?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| FileError::from_csv(path.to_path_buf(), e))?
        .clone();
    if headers.is_empty() {
        return Err(FileError::Parse {
            path: path.to_path_buf(),
            reason: format!("no header row after skipping {} line(s)", skip_lines),
        });
    }
    debug!(columns = ?headers.iter().collect::<Vec<_>>(), "header");

    let column = |name: &str| headers.iter().position(|h| h == name);
    let (years_idx, number_idx) = match (column("Years"), column("Number")) {
        (Some(y), Some(n)) => (y, n),
        (y, n) => {
            let missing = [(REQUIRED_COLUMNS[0], y), (REQUIRED_COLUMNS[1], n)]
                .into_iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            return Err(FileError::Schema {
                path: path.to_path_buf(),
                missing,
            });
        }
    };

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|e| FileError::from_csv(path.to_path_buf(), e))?;
        if row.len() > headers.len() {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            return Err(FileError::Parse {
                path: path.to_path_buf(),
                reason: format!(
                    "expected {} fields on line {}, saw {}",
                    headers.len(),
                    line + skip_lines as u64,
                    row.len()
                ),
            });
        }
        records.push(Record {
            years: row.get(years_idx).unwrap_or_default().to_string(),
            number: row.get(number_idx).unwrap_or_default().to_string(),
            country: country.to_string(),
        });
    }

    debug!(rows = records.len(), "read");
    Ok(records)
}

/// Discard `n` physical lines. `\n`, `\r` and `\r\n` each end one line.
/// Stops early at end of file.
fn skip_preamble<R: BufRead>(reader: &mut R, n: usize) -> std::io::Result<()> {
    let mut after_cr = false;
    let mut skipped = 0;
    while skipped < n || after_cr {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        if after_cr {
            after_cr = false;
            if buf[0] == b'\n' {
                reader.consume(1);
            }
            continue;
        }
        match buf.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) => {
                after_cr = buf[i] == b'\r';
                reader.consume(i + 1);
                skipped += 1;
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
    Ok(())
}
