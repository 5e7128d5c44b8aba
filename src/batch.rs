//
// batch.rs
// dicom-nifti-batch
//
// Run orchestration: environment check, one walk over the input tree, classify each candidate
// folder, convert the matches, and summarize.
//

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use crate::classify::is_dicom_folder;
use crate::config::RunConfig;
use crate::environment::{check_environment, resolve_roots};
use crate::error::EnvironmentError;
use crate::invoke::{convert_directory, ToolRunner};
use crate::models::{FolderRecord, RunSummary};
use crate::walker::candidate_folders;

/// Convert every DICOM-looking folder under the input root.
///
/// Only environment failures are returned as errors; per-folder problems are logged and
/// tallied in the summary.
pub fn run_batch<R>(runner: &R, config: &RunConfig) -> Result<RunSummary, EnvironmentError>
where
    R: ToolRunner + ?Sized,
{
    check_environment(config)?;
    let resolved = resolve_roots(config)?;
    let config = &resolved;

    let started = Instant::now();
    let mut summary = RunSummary::new(config.input_root.clone(), config.output_root.clone());

    info!("Walking directory tree: {}", config.input_root.display());

    for folder in candidate_folders(&config.input_root, &config.output_root) {
        summary.visited += 1;
        if !is_dicom_folder(&folder) {
            continue;
        }
        summary.matched += 1;

        let outcome = convert_directory(runner, config, &folder);
        summary.record(FolderRecord::from_outcome(folder, &outcome));
    }

    summary.elapsed_secs = started.elapsed().as_secs_f64();
    log_summary(&summary);
    Ok(summary)
}

fn log_summary(summary: &RunSummary) {
    info!(
        "Batch finished. Folders processed: {}.",
        summary.processed
    );
    if summary.with_problems + summary.failed > 0 {
        info!(
            "Converted cleanly: {}, with problems: {}, failed to run: {}.",
            summary.converted, summary.with_problems, summary.failed
        );
    }
    info!("Total time: {:.2} seconds.", summary.elapsed_secs);
    info!("Check the output directory: {}", summary.output_root.display());
}

/// Persist the summary as pretty JSON.
pub fn write_report(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create report directory")?;
    }
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize run report")?;
    fs::write(path, json).context("Failed to write run report")?;
    info!("Run report saved to {}", path.display());
    Ok(())
}
