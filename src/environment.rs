//
// environment.rs
// dicom-nifti-batch
//
// Pre-flight checks run before the tree walk: the converter and input root must exist, and the
// output root is created on demand.
//

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::RunConfig;
use crate::error::EnvironmentError;

/// Verify the converter and input root, then create the output root (and parents).
pub fn check_environment(config: &RunConfig) -> Result<(), EnvironmentError> {
    if !config.converter.exists() {
        return Err(EnvironmentError::MissingConverter(config.converter.clone()));
    }
    if !config.input_root.exists() {
        return Err(EnvironmentError::MissingInputRoot(config.input_root.clone()));
    }

    fs::create_dir_all(&config.output_root).map_err(|source| {
        EnvironmentError::CreateOutputRoot {
            path: config.output_root.clone(),
            source,
        }
    })?;

    info!("Environment check passed, starting conversion run");
    Ok(())
}

/// Copy of `config` with both roots canonicalized, so `./data/nifti` and `data/nifti` compare
/// equal during pruning and mirroring. Call after [`check_environment`] created the output root.
pub fn resolve_roots(config: &RunConfig) -> Result<RunConfig, EnvironmentError> {
    let canonical = |path: &Path| {
        fs::canonicalize(path).map_err(|source| EnvironmentError::ResolveRoot {
            path: path.to_path_buf(),
            source,
        })
    };

    Ok(RunConfig {
        input_root: canonical(&config.input_root)?,
        output_root: canonical(&config.output_root)?,
        ..config.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_converter_is_fatal() {
        let root = tempdir().expect("tempdir");
        let config = RunConfig::new(
            root.path().join("no-such-dcm2niix"),
            root.path(),
            root.path().join("out"),
        );

        let err = check_environment(&config).unwrap_err();
        assert!(matches!(err, EnvironmentError::MissingConverter(_)));
        assert!(!root.path().join("out").exists());
    }

    #[test]
    fn missing_input_root_is_fatal() {
        let root = tempdir().expect("tempdir");
        let converter = root.path().join("dcm2niix");
        fs::write(&converter, b"").expect("fake converter");
        let config = RunConfig::new(&converter, root.path().join("missing"), root.path().join("out"));

        let err = check_environment(&config).unwrap_err();
        assert!(matches!(err, EnvironmentError::MissingInputRoot(_)));
    }

    #[test]
    fn creates_nested_output_root_and_is_idempotent() {
        let root = tempdir().expect("tempdir");
        let converter = root.path().join("dcm2niix");
        fs::write(&converter, b"").expect("fake converter");
        let output = root.path().join("deep").join("nested").join("out");
        let config = RunConfig::new(&converter, root.path(), &output);

        check_environment(&config).expect("first check");
        assert!(output.is_dir());
        check_environment(&config).expect("second check");
    }

    #[test]
    fn resolved_roots_share_one_spelling() {
        let root = tempdir().expect("tempdir");
        let converter = root.path().join("dcm2niix");
        fs::write(&converter, b"").expect("fake converter");
        let input = root.path().join("data");
        fs::create_dir_all(&input).expect("input");
        let output = input.join("..").join("data").join(".").join("nifti");
        let config = RunConfig::new(&converter, &input, &output);

        check_environment(&config).expect("check");
        let resolved = resolve_roots(&config).expect("resolve");

        let canonical_input = input.canonicalize().expect("canonical input");
        assert_eq!(resolved.input_root, canonical_input);
        assert_eq!(resolved.output_root, canonical_input.join("nifti"));
        assert_eq!(resolved.converter, config.converter);
        assert_eq!(resolved.converter_args, config.converter_args);
    }
}
