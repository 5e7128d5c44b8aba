//
// error.rs
// dicom-nifti-batch
//
// Error types for configuration, environment checks, and converter invocation.
//

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Run-fatal problems detected before the tree walk starts.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("converter executable not found: {}", .0.display())]
    MissingConverter(PathBuf),
    #[error("input directory not found: {}", .0.display())]
    MissingInputRoot(PathBuf),
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateOutputRoot { path: PathBuf, source: io::Error },
    #[error("failed to resolve {}: {source}", .path.display())]
    ResolveRoot { path: PathBuf, source: io::Error },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting `{0}` (pass it on the command line or in the config file)")]
    Missing(&'static str),
    #[error("failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The converter process could not be run at all.
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("failed to launch {}: {source}", .program.display())]
    Spawn { program: PathBuf, source: io::Error },
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{} is not inside input root {}", .source_dir.display(), .input_root.display())]
    OutsideInputRoot {
        source_dir: PathBuf,
        input_root: PathBuf,
    },
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateOutputDir { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}
