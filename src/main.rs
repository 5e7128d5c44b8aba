//
// main.rs
// dicom-nifti-batch
//
// Entry point that hands off execution to the CLI layer and returns its exit status.
//

use std::process::ExitCode;

use dicom_nifti_batch::cli;

fn main() -> ExitCode {
    cli::run()
}
