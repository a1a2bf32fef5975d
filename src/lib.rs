pub mod combine;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod pivot;
pub mod table;

pub use combine::{combine, CombineReport};
pub use config::{CombinerConfig, ConfigOverrides, LabelSource};
pub use error::{ConfigError, FileError};
