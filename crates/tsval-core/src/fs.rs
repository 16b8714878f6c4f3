//! File helpers shared by the pipeline stages.

use std::io::ErrorKind;
use std::path::Path;

use crate::errors::CoreError;

/// Create `dir` and all missing parents. An existing directory is fine.
///
/// # Errors
/// Returns `CoreError::FileSystem` when the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<(), CoreError> {
    std::fs::create_dir_all(dir).map_err(|e| CoreError::fs("create directory", dir, e))
}

/// Remove a file left by a previous run.
///
/// Returns `true` when a file was removed and `false` when none existed.
///
/// # Errors
/// Any failure other than "not found" is returned as `CoreError::FileSystem`.
pub fn remove_stale(path: &Path) -> Result<bool, CoreError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CoreError::fs("remove", path, e)),
    }
}

/// Write `contents` to `path`, replacing any existing file.
///
/// # Errors
/// Returns `CoreError::FileSystem` when the write fails.
pub fn write_file(path: &Path, contents: &str) -> Result<(), CoreError> {
    std::fs::write(path, contents).map_err(|e| CoreError::fs("write", path, e))
}

/// Read a UTF-8 file.
///
/// # Errors
/// Returns `CoreError::FileSystem` when the file is missing or not UTF-8.
pub fn read_file(path: &Path) -> Result<String, CoreError> {
    std::fs::read_to_string(path).map_err(|e| CoreError::fs("read", path, e))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn remove_stale_tolerates_absent_file() {
        let temp = TempDir::new().expect("tempdir should create");
        let removed = remove_stale(&temp.path().join("missing.json")).expect("absent is fine");
        assert!(!removed);
    }

    #[test]
    fn remove_stale_deletes_existing_file() {
        let temp = TempDir::new().expect("tempdir should create");
        let path = temp.path().join("old.json");
        write_file(&path, "{}").expect("write should succeed");

        assert!(remove_stale(&path).expect("remove should succeed"));
        assert!(!path.exists());
    }

    #[test]
    fn remove_stale_propagates_other_failures() {
        let temp = TempDir::new().expect("tempdir should create");
        let dir = temp.path().join("a-directory");
        ensure_dir(&dir).expect("dir should create");

        let err = remove_stale(&dir).expect_err("removing a directory as a file fails");
        assert!(matches!(err, CoreError::FileSystem { action: "remove", .. }));
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let temp = TempDir::new().expect("tempdir should create");
        let nested = temp.path().join("a/b/c");
        ensure_dir(&nested).expect("first create");
        ensure_dir(&nested).expect("second create");
        assert!(nested.is_dir());
    }
}
