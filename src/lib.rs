//
// lib.rs
// dicom-nifti-batch
//
// Exposes the crate's modules and re-exports the batch entry points for both binary and library
// consumers.
//

// Public surface of the library: one module per pipeline stage plus shared plumbing.
pub mod batch;
pub mod classify;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod invoke;
pub mod logging;
pub mod models;
pub mod walker;

pub use batch::{run_batch, write_report};
pub use cli::{run as run_cli, Cli};
pub use config::RunConfig;
pub use invoke::{SystemRunner, ToolOutput, ToolRunner};
pub use models::RunSummary;
