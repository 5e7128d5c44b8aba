//
// models.rs
// dicom-nifti-batch
//
// Serializable records describing a batch run: one entry per converted folder plus the totals.
//

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::invoke::ConversionOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderStatus {
    Converted,
    ToolReportedProblem,
    InvocationFailed,
}

/// What happened to one folder that was handed to the converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub source: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub status: FolderStatus,
    pub exit_code: Option<i32>,
    pub converted_lines: Vec<String>,
    pub error: Option<String>,
}

impl FolderRecord {
    pub fn from_outcome(source: PathBuf, outcome: &ConversionOutcome) -> Self {
        let output_dir = outcome.output_dir().map(|p| p.to_path_buf());
        match outcome {
            ConversionOutcome::Converted {
                converted_lines, ..
            } => Self {
                source,
                output_dir,
                status: FolderStatus::Converted,
                exit_code: Some(0),
                converted_lines: converted_lines.clone(),
                error: None,
            },
            ConversionOutcome::ToolReportedProblem { output, .. } => Self {
                source,
                output_dir,
                status: FolderStatus::ToolReportedProblem,
                exit_code: output.exit_code,
                converted_lines: Vec::new(),
                error: Some(output.stderr.trim().to_string()).filter(|s| !s.is_empty()),
            },
            ConversionOutcome::InvocationFailed { error, .. } => Self {
                source,
                output_dir,
                status: FolderStatus::InvocationFailed,
                exit_code: None,
                converted_lines: Vec::new(),
                error: Some(error.to_string()),
            },
        }
    }
}

/// Totals for one run. `processed` counts every folder handed to the converter,
/// whatever the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub visited: usize,
    pub matched: usize,
    pub processed: usize,
    pub converted: usize,
    pub with_problems: usize,
    pub failed: usize,
    pub elapsed_secs: f64,
    pub folders: Vec<FolderRecord>,
}

impl RunSummary {
    pub fn new(input_root: PathBuf, output_root: PathBuf) -> Self {
        Self {
            input_root,
            output_root,
            visited: 0,
            matched: 0,
            processed: 0,
            converted: 0,
            with_problems: 0,
            failed: 0,
            elapsed_secs: 0.0,
            folders: Vec::new(),
        }
    }

    pub fn record(&mut self, record: FolderRecord) {
        self.processed += 1;
        match record.status {
            FolderStatus::Converted => self.converted += 1,
            FolderStatus::ToolReportedProblem => self.with_problems += 1,
            FolderStatus::InvocationFailed => self.failed += 1,
        }
        self.folders.push(record);
    }
}
