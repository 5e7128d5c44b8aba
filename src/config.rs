//
// config.rs
// dicom-nifti-batch
//
// Static run configuration: converter location, input/output roots, log file, and the
// fixed dcm2niix argument list. Values come from an optional JSON file overridden by the CLI.
//

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Log file used when neither the CLI nor the config file names one.
pub const DEFAULT_LOG_FILE: &str = "conversion_log.txt";

/// dcm2niix defaults: `%i_%p_%t_%s` file names, gzip output, BIDS sidecar, quiet.
pub const DEFAULT_CONVERTER_ARGS: [&str; 8] = ["-f", "%i_%p_%t_%s", "-z", "y", "-b", "y", "-v", "n"];

/// Settings as they appear in a JSON config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub converter: Option<PathBuf>,
    pub input_root: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub converter_args: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merged_with(self, overrides: FileConfig) -> FileConfig {
        FileConfig {
            converter: overrides.converter.or(self.converter),
            input_root: overrides.input_root.or(self.input_root),
            output_root: overrides.output_root.or(self.output_root),
            log_file: overrides.log_file.or(self.log_file),
            converter_args: overrides
                .converter_args
                .filter(|args| !args.is_empty())
                .or(self.converter_args),
        }
    }
}

/// Fully resolved configuration for one batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub converter: PathBuf,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub log_file: PathBuf,
    pub converter_args: Vec<String>,
}

impl RunConfig {
    pub fn new(
        converter: impl Into<PathBuf>,
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            converter: converter.into(),
            input_root: input_root.into(),
            output_root: output_root.into(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            converter_args: default_converter_args(),
        }
    }
}

impl TryFrom<FileConfig> for RunConfig {
    type Error = ConfigError;

    fn try_from(value: FileConfig) -> Result<Self, Self::Error> {
        let converter = value.converter.ok_or(ConfigError::Missing("converter"))?;
        let input_root = value.input_root.ok_or(ConfigError::Missing("input_root"))?;
        let output_root = value
            .output_root
            .ok_or(ConfigError::Missing("output_root"))?;

        Ok(Self {
            converter,
            input_root,
            output_root,
            log_file: value
                .log_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            converter_args: value
                .converter_args
                .filter(|args| !args.is_empty())
                .unwrap_or_else(default_converter_args),
        })
    }
}

pub fn default_converter_args() -> Vec<String> {
    DEFAULT_CONVERTER_ARGS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn cli_values_override_file_values() {
        let file = FileConfig {
            converter: Some("/opt/dcm2niix".into()),
            input_root: Some("/data/in".into()),
            output_root: Some("/data/out".into()),
            log_file: None,
            converter_args: Some(vec!["-z".into(), "n".into()]),
        };
        let cli = FileConfig {
            input_root: Some("/mnt/scans".into()),
            converter_args: Some(Vec::new()),
            ..FileConfig::default()
        };

        let config = RunConfig::try_from(file.merged_with(cli)).expect("resolve");
        assert_eq!(config.converter, PathBuf::from("/opt/dcm2niix"));
        assert_eq!(config.input_root, PathBuf::from("/mnt/scans"));
        assert_eq!(config.converter_args, vec!["-z", "n"]);
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn missing_required_setting_is_reported() {
        let partial = FileConfig {
            converter: Some("/opt/dcm2niix".into()),
            output_root: Some("/data/out".into()),
            ..FileConfig::default()
        };
        let err = RunConfig::try_from(partial).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("input_root")));
    }

    #[test]
    fn empty_args_fall_back_to_defaults() {
        let config = RunConfig::try_from(FileConfig {
            converter: Some("c".into()),
            input_root: Some("i".into()),
            output_root: Some("o".into()),
            converter_args: Some(Vec::new()),
            ..FileConfig::default()
        })
        .expect("resolve");
        assert_eq!(config.converter_args, default_converter_args());
    }

    #[test]
    fn loads_json_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"{ "converter": "/usr/bin/dcm2niix", "converter_args": ["-z", "i"] }"#,
        )
        .expect("write config");

        let loaded = FileConfig::load(&path).expect("load");
        assert_eq!(loaded.converter, Some(PathBuf::from("/usr/bin/dcm2niix")));
        assert_eq!(loaded.converter_args, Some(vec!["-z".to_string(), "i".to_string()]));
        assert!(loaded.input_root.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("batch.json");
        fs::write(&path, r#"{ "converterr": "typo" }"#).expect("write config");
        assert!(matches!(
            FileConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
