//
// walker.rs
// dicom-nifti-batch
//
// Lazy recursive enumeration of candidate folders under the input root, pruning the output tree.
//

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// Directories under `input_root` that directly contain at least one file.
///
/// Anything at or below `output_root` is pruned before it is read, so an output tree nested
/// inside the input tree is never re-scanned. Containment is component-wise, so both roots must
/// be spelled the same way (see `environment::resolve_roots`). Order is depth-first by file name.
pub fn candidate_folders(input_root: &Path, output_root: &Path) -> impl Iterator<Item = PathBuf> {
    let output_root = output_root.to_path_buf();

    WalkDir::new(input_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| !is_within(entry.path(), &output_root))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable path: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        // An unlistable directory is reported once, by walkdir, when it tries to descend.
        .filter(|dir| contains_files(dir).unwrap_or(false))
}

/// Component-wise containment; `/data/out2` is not within `/data/out`.
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// True when `dir` has at least one immediate child that is not a directory.
pub fn contains_files(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .any(|e| !e.path().is_dir()))
}
