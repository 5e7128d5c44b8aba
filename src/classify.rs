//
// classify.rs
// dicom-nifti-batch
//
// Heuristic DICOM folder detection: sample the first few files and accept the folder on the
// first file with a known extension or the `DICM` preamble signature.
//

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Number of files inspected per folder.
pub const SAMPLE_SIZE: usize = 5;

/// Extensions accepted without opening the file (compared case-insensitively).
pub const DICOM_EXTENSIONS: [&str; 3] = ["dcm", "docm", "ima"];

/// Offset of the signature, right after the 128-byte preamble.
pub const MAGIC_OFFSET: u64 = 128;
pub const DICOM_MAGIC: [u8; 4] = *b"DICM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    Extension,
    MagicBytes,
}

/// Outcome of inspecting one sampled file.
#[derive(Debug)]
pub enum Probe {
    Match(MatchReason),
    NoMatch,
    Unreadable(io::Error),
}

/// Returns true when the folder looks like a DICOM series.
///
/// A folder that cannot be listed is logged and treated as non-matching.
pub fn is_dicom_folder(dir: &Path) -> bool {
    let sample = match sample_folder(dir) {
        Ok(sample) => sample,
        Err(err) => {
            warn!("Unable to scan folder {}: {}", dir.display(), err);
            return false;
        }
    };

    sample.iter().any(|file| match probe_file(file) {
        Probe::Match(reason) => {
            debug!("{} matched by {:?}", file.display(), reason);
            true
        }
        Probe::NoMatch => false,
        Probe::Unreadable(err) => {
            debug!("Skipping unreadable file {}: {}", file.display(), err);
            false
        }
    })
}

/// The first [`SAMPLE_SIZE`] regular files of `dir`, ordered by name.
pub fn sample_folder(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files.truncate(SAMPLE_SIZE);
    Ok(files)
}

pub fn probe_file(path: &Path) -> Probe {
    if has_dicom_extension(path) {
        return Probe::Match(MatchReason::Extension);
    }
    match has_dicom_magic(path) {
        Ok(true) => Probe::Match(MatchReason::MagicBytes),
        Ok(false) => Probe::NoMatch,
        Err(err) => Probe::Unreadable(err),
    }
}

pub fn has_dicom_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            DICOM_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Reads the 4 bytes at [`MAGIC_OFFSET`]. Files too short to hold them do not match.
pub fn has_dicom_magic(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(MAGIC_OFFSET))?;

    let mut header = [0u8; 4];
    match file.read_exact(&mut header) {
        Ok(()) => Ok(header == DICOM_MAGIC),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err),
    }
}
