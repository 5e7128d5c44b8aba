//
// invoke.rs
// dicom-nifti-batch
//
// Runs the external converter (dcm2niix) for one folder: mirrors the output directory, builds the
// argument list, captures the process result, and logs it.
//

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{error, info, warn};

use crate::config::RunConfig;
use crate::error::{ConvertError, InvokeError};

/// Substring dcm2niix prints for every series it writes.
pub const CONVERSION_MARKER: &str = "Convert";

/// Captured result of one converter process. `exit_code` is `None` when killed by a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Seam between the batch logic and process spawning.
pub trait ToolRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, InvokeError>;
}

/// Spawns the converter with `std::process::Command` and waits for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, InvokeError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| InvokeError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        // dcm2niix echoes patient names in the local code page; keep whatever decodes.
        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug)]
pub enum ConversionOutcome {
    /// Exit code 0. `converted_lines` are the stdout lines carrying [`CONVERSION_MARKER`].
    Converted {
        output_dir: PathBuf,
        converted_lines: Vec<String>,
    },
    /// The tool ran but exited non-zero; often benign (nothing convertible found).
    ToolReportedProblem {
        output_dir: PathBuf,
        output: ToolOutput,
    },
    InvocationFailed {
        output_dir: Option<PathBuf>,
        error: ConvertError,
    },
}

impl ConversionOutcome {
    pub fn output_dir(&self) -> Option<&Path> {
        match self {
            ConversionOutcome::Converted { output_dir, .. }
            | ConversionOutcome::ToolReportedProblem { output_dir, .. } => Some(output_dir.as_path()),
            ConversionOutcome::InvocationFailed { output_dir, .. } => output_dir.as_deref(),
        }
    }
}

/// `output_root / relative_path(source, input_root)`.
pub fn mirror_path(
    source: &Path,
    input_root: &Path,
    output_root: &Path,
) -> Result<PathBuf, ConvertError> {
    let relative = source
        .strip_prefix(input_root)
        .map_err(|_| ConvertError::OutsideInputRoot {
            source_dir: source.to_path_buf(),
            input_root: input_root.to_path_buf(),
        })?;
    Ok(output_root.join(relative))
}

/// `<fixed args...> -o <output_dir> <source>`; dcm2niix requires the input folder last.
pub fn build_command_args(fixed_args: &[String], output_dir: &Path, source: &Path) -> Vec<OsString> {
    fixed_args
        .iter()
        .map(OsString::from)
        .chain([
            OsString::from("-o"),
            output_dir.as_os_str().to_owned(),
            source.as_os_str().to_owned(),
        ])
        .collect()
}

/// Stdout lines containing [`CONVERSION_MARKER`], trimmed.
pub fn conversion_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.contains(CONVERSION_MARKER))
        .map(|line| line.trim().to_string())
        .collect()
}

/// Convert one classified folder. Never fails the batch; every failure mode is an outcome.
pub fn convert_directory<R>(runner: &R, config: &RunConfig, source: &Path) -> ConversionOutcome
where
    R: ToolRunner + ?Sized,
{
    let output_dir = match prepare_output_dir(config, source) {
        Ok(dir) => dir,
        Err(err) => {
            error!("Cannot prepare output for {}: {}", source.display(), err);
            return ConversionOutcome::InvocationFailed {
                output_dir: None,
                error: err,
            };
        }
    };

    info!("Processing: {}", source.display());
    info!("Output target: {}", output_dir.display());

    let args = build_command_args(&config.converter_args, &output_dir, source);
    let output = match runner.run(&config.converter, &args) {
        Ok(output) => output,
        Err(err) => {
            error!("Exception while running conversion command: {}", err);
            return ConversionOutcome::InvocationFailed {
                output_dir: Some(output_dir),
                error: err.into(),
            };
        }
    };

    if output.success() {
        info!("Conversion succeeded: {}", source.display());
        let converted_lines = conversion_lines(&output.stdout);
        for line in &converted_lines {
            info!("  -> {}", line);
        }
        ConversionOutcome::Converted {
            output_dir,
            converted_lines,
        }
    } else {
        let code = output
            .exit_code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        warn!(
            "Conversion may have problems (code {}): {}",
            code,
            source.display()
        );
        warn!("Tool output: {}", output.stdout);
        if !output.stderr.is_empty() {
            error!("Error output: {}", output.stderr);
        }
        ConversionOutcome::ToolReportedProblem { output_dir, output }
    }
}

fn prepare_output_dir(config: &RunConfig, source: &Path) -> Result<PathBuf, ConvertError> {
    let output_dir = mirror_path(source, &config.input_root, &config.output_root)?;
    fs::create_dir_all(&output_dir).map_err(|source| ConvertError::CreateOutputDir {
        path: output_dir.clone(),
        source,
    })?;
    Ok(output_dir)
}
