//
// cli.rs
// dicom-nifti-batch
//
// Defines the CLI surface with Clap, resolves the run configuration, installs logging, and maps
// the batch result onto the process exit status.
//

use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::batch::{run_batch, write_report};
use crate::config::{FileConfig, RunConfig};
use crate::error::ConfigError;
use crate::invoke::SystemRunner;
use crate::logging::{init_console_logging, init_logging, log_fatal};

/// Command-line interface: every setting may also come from `--config`.
#[derive(Parser, Debug)]
#[command(name = "dicom-nifti-batch")]
#[command(about = "Batch-convert DICOM folders to NIfTI using dcm2niix", long_about = None)]
pub struct Cli {
    /// Path to the dcm2niix executable
    #[arg(short, long)]
    pub converter: Option<PathBuf>,
    /// Root of the DICOM tree to scan
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Root of the mirrored NIfTI output tree
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Append-mode log file (default: conversion_log.txt)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// JSON file with default settings; command-line values take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Log per-file classification details
    #[arg(short, long)]
    pub verbose: bool,
    /// Arguments passed to dcm2niix before `-o <dir> <input>` (after `--`)
    #[arg(last = true)]
    pub converter_args: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> FileConfig {
        FileConfig {
            converter: self.converter.clone(),
            input_root: self.input.clone(),
            output_root: self.output.clone(),
            log_file: self.log_file.clone(),
            converter_args: Some(self.converter_args.clone()),
        }
    }

    /// Merge the optional config file with command-line overrides.
    pub fn resolve_config(&self) -> Result<RunConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        RunConfig::try_from(base.merged_with(self.overrides()))
    }
}

pub fn run() -> ExitCode {
    // Parse once; the log file is only known after the configuration resolves.
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(err) => return fail_before_logging(err, cli.verbose),
    };

    if let Err(err) = init_logging(&config.log_file, cli.verbose) {
        return fail_before_logging(format!("{:#}", err), cli.verbose);
    }

    let summary = match run_batch(&SystemRunner, &config) {
        Ok(summary) => summary,
        Err(err) => {
            log_fatal(err);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &cli.report {
        if let Err(err) = write_report(&summary, path) {
            error!("{:#}", err);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

/// Report a fatal startup error on the console at CRITICAL, without a log file.
fn fail_before_logging(message: impl Display, verbose: bool) -> ExitCode {
    if let Err(err) = init_console_logging(verbose) {
        eprintln!("{:#}", err);
    }
    log_fatal(message);
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::test_support::captured_lines;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn trailing_arguments_become_converter_args() {
        let cli = Cli::try_parse_from([
            "dicom-nifti-batch",
            "-c",
            "/opt/dcm2niix",
            "-i",
            "/data/in",
            "-o",
            "/data/out",
            "--",
            "-z",
            "n",
            "-b",
            "n",
        ])
        .expect("parse");

        let config = cli.resolve_config().expect("resolve");
        assert_eq!(config.converter_args, vec!["-z", "n", "-b", "n"]);
        assert_eq!(config.output_root, PathBuf::from("/data/out"));
    }

    #[test]
    fn without_trailing_arguments_defaults_apply() {
        let cli = Cli::try_parse_from(["dicom-nifti-batch", "-c", "c", "-i", "i", "-o", "o"])
            .expect("parse");
        let config = cli.resolve_config().expect("resolve");
        assert_eq!(config.converter_args, crate::config::default_converter_args());
    }

    #[test]
    fn config_file_supplies_missing_flags() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"{ "converter": "/opt/dcm2niix", "input_root": "/data/in", "output_root": "/data/out", "log_file": "/var/log/batch.txt" }"#,
        )
        .expect("write config");

        let cli = Cli::try_parse_from([
            "dicom-nifti-batch",
            "--config",
            path.to_str().unwrap(),
            "-o",
            "/scratch/out",
        ])
        .expect("parse");
        let config = cli.resolve_config().expect("resolve");
        assert_eq!(config.input_root, PathBuf::from("/data/in"));
        assert_eq!(config.output_root, PathBuf::from("/scratch/out"));
        assert_eq!(config.log_file, PathBuf::from("/var/log/batch.txt"));
    }

    #[test]
    fn configuration_failure_is_logged_as_critical() {
        let (_code, lines) = captured_lines(|| {
            fail_before_logging(ConfigError::Missing("input_root"), false)
        });

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(" - CRITICAL - Error: missing required setting `input_root`"));
    }

    #[test]
    fn missing_converter_is_a_config_error() {
        let cli = Cli::try_parse_from(["dicom-nifti-batch", "-i", "i", "-o", "o"]).expect("parse");
        assert!(matches!(
            cli.resolve_config(),
            Err(ConfigError::Missing("converter"))
        ));
    }
}
