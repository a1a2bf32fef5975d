use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::ConfigError;

pub const DEFAULT_INPUT_DIR: &str = "~/Downloads/solar-sense/data/France";
pub const DEFAULT_OUTPUT_FILE: &str = "~/Downloads/solar-sense/data/out/France.csv";
pub const DEFAULT_COUNTRY_LABEL: &str = "France";

/// Leading lines of every export that precede the header row.
pub const DEFAULT_SKIP_LINES: usize = 2;

/// Where the `country` value of an ingested row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    /// Every row gets `country_label`, whatever the file is called.
    #[default]
    Fixed,
    /// The file name minus its `.csv` suffix, e.g. `Spain.csv` → `Spain`.
    FileStem,
}

/// Settings for one combine run.
///
/// Loaded from YAML, then overridden field by field from the command line.
/// Paths may start with `~`; call [`CombinerConfig::resolve`] before use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombinerConfig {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub country_label: String,
    pub label_source: LabelSource,
    pub skip_lines: usize,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            country_label: DEFAULT_COUNTRY_LABEL.to_string(),
            label_source: LabelSource::Fixed,
            skip_lines: DEFAULT_SKIP_LINES,
        }
    }
}

/// Values given on the command line. `None` leaves the loaded value alone.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub country_label: Option<String>,
    pub label_from_filename: bool,
    pub skip_lines: Option<usize>,
}

impl CombinerConfig {
    /// Parse a YAML config file. Missing keys take their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_overrides(mut self, o: ConfigOverrides) -> Self {
        if let Some(dir) = o.input_dir {
            self.input_dir = dir;
        }
        if let Some(file) = o.output_file {
            self.output_file = file;
        }
        if let Some(label) = o.country_label {
            self.country_label = label;
        }
        if o.label_from_filename {
            self.label_source = LabelSource::FileStem;
        }
        if let Some(n) = o.skip_lines {
            self.skip_lines = n;
        }
        self
    }

    /// Expand `~` in both paths and check the label.
    pub fn resolve(self) -> Result<Self, ConfigError> {
        if self.label_source == LabelSource::Fixed && self.country_label.trim().is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        Ok(Self {
            input_dir: expand_home(&self.input_dir)?,
            output_file: expand_home(&self.output_file)?,
            ..self
        })
    }

    /// The `country` value for rows read from `file`.
    pub fn label_for(&self, file: &Path) -> String {
        match self.label_source {
            LabelSource::Fixed => self.country_label.clone(),
            LabelSource::FileStem => {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                name.strip_suffix(".csv").unwrap_or(&name).to_string()
            }
        }
    }
}

fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_fixed_layout() {
        let cfg = CombinerConfig::default();
        assert_eq!(cfg.country_label, "France");
        assert_eq!(cfg.skip_lines, 2);
        assert_eq!(cfg.label_source, LabelSource::Fixed);
        assert!(cfg.output_file.ends_with("out/France.csv"));
    }

    #[test]
    fn yaml_fills_missing_keys_with_defaults() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("combiner.yaml");
        fs::write(
            &path,
            "input_dir: /data/Spain\nlabel_source: file_stem\n",
        )?;

        let cfg = CombinerConfig::from_yaml_file(&path)?;
        assert_eq!(cfg.input_dir, PathBuf::from("/data/Spain"));
        assert_eq!(cfg.label_source, LabelSource::FileStem);
        assert_eq!(cfg.output_file, PathBuf::from(DEFAULT_OUTPUT_FILE));
        Ok(())
    }

    #[test]
    fn yaml_rejects_unknown_keys() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("combiner.yaml");
        fs::write(&path, "input_directory: /data\n")?;

        let err = CombinerConfig::from_yaml_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
        Ok(())
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let cfg = CombinerConfig::default().with_overrides(ConfigOverrides {
            country_label: Some("Italy".into()),
            skip_lines: Some(0),
            ..Default::default()
        });
        assert_eq!(cfg.country_label, "Italy");
        assert_eq!(cfg.skip_lines, 0);
        assert_eq!(cfg.input_dir, PathBuf::from(DEFAULT_INPUT_DIR));
    }

    #[test]
    fn resolve_expands_home_and_keeps_absolute_paths() -> Result<()> {
        let cfg = CombinerConfig {
            input_dir: PathBuf::from("/srv/in"),
            ..Default::default()
        }
        .resolve()?;
        assert_eq!(cfg.input_dir, PathBuf::from("/srv/in"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                cfg.output_file,
                home.join("Downloads/solar-sense/data/out/France.csv")
            );
        }
        Ok(())
    }

    #[test]
    fn resolve_rejects_blank_fixed_label() {
        let cfg = CombinerConfig {
            country_label: "  ".into(),
            input_dir: PathBuf::from("/in"),
            output_file: PathBuf::from("/out.csv"),
            ..Default::default()
        };
        assert!(matches!(cfg.resolve(), Err(ConfigError::EmptyLabel)));
    }

    #[test]
    fn label_for_follows_source() {
        let fixed = CombinerConfig::default();
        assert_eq!(fixed.label_for(Path::new("/x/Spain.csv")), "France");

        let stem = CombinerConfig {
            label_source: LabelSource::FileStem,
            ..Default::default()
        };
        assert_eq!(stem.label_for(Path::new("/x/Spain.csv")), "Spain");
        assert_eq!(stem.label_for(Path::new("/x/uv.2021.csv")), "uv.2021");
    }
}
