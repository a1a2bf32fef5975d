use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Write `headers` then `rows` as comma-separated CSV to `path`.
///
/// The data goes to `.<name>.tmp` next to `path`, is synced, then renamed
/// over `path`, so a crash mid-write leaves the previous file intact.
/// Missing parent directories are created.
pub fn write_csv_atomic<I, R, T>(path: &Path, headers: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .with_context(|| format!("creating output directory {}", parent.display()))?;

    let file_name = path
        .file_name()
        .with_context(|| format!("output path {} has no file name", path.display()))?
        .to_string_lossy();
    let tmp_path = parent.join(format!(".{}.tmp", file_name));

    if let Err(e) = write_rows(&tmp_path, headers, rows) {
        if let Err(rm) = fs::remove_file(&tmp_path) {
            warn!(path = %tmp_path.display(), "failed to remove temp file: {}", rm);
        }
        return Err(e);
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
    debug!(path = %path.display(), "wrote");
    Ok(())
}

fn write_rows<I, R, T>(tmp_path: &Path, headers: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let file = File::create(tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    wtr.write_record(headers).context("writing CSV header")?;
    for row in rows {
        wtr.write_record(row).context("writing CSV row")?;
    }

    let file = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing {}: {}", tmp_path.display(), e.error()))?
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing {}: {}", tmp_path.display(), e.error()))?;
    file.sync_all()
        .with_context(|| format!("syncing {}", tmp_path.display()))?;
    Ok(())
}
