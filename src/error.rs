use std::{io, path::PathBuf};

/// Why a single input file contributed no rows.
///
/// These never abort a combine run; the caller logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed CSV in {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("{} does not contain column(s) {}", path.display(), missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },
}

impl FileError {
    /// Short tag used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FileError::Io { .. } => "io",
            FileError::Parse { .. } => "parse",
            FileError::Schema { .. } => "schema",
        }
    }

    pub(crate) fn from_csv(path: PathBuf, err: csv::Error) -> Self {
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => FileError::Io { path, source },
            _ => FileError::Parse { path, reason },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing config {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot expand `~`: no home directory for the current user")]
    NoHomeDir,

    #[error("country label must not be empty")]
    EmptyLabel,
}
