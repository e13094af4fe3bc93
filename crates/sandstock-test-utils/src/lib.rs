//! Test utilities for Sandstock crates.

use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file with given name and content.
pub fn temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Path of a not-yet-created SQLite file inside a fresh temp dir.
pub fn temp_database() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("sandstock.db");
    (dir, path)
}

/// Writes `sandstock.yaml` into a fresh temp dir.
pub fn temp_config(yaml: &str) -> (TempDir, PathBuf) {
    temp_file("sandstock.yaml", yaml)
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_temp_database_is_not_created() {
        let (dir, path) = temp_database();
        assert!(dir.path().is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn test_assert_macros() {
        let ok: Result<u8, String> = Ok(3);
        assert_eq!(assert_ok!(ok), 3);

        let err: Result<u8, String> = Err("boom".into());
        assert_eq!(assert_err!(err), "boom");
    }

    proptest! {
        #[test]
        fn test_temp_config_roundtrip(content in "\\PC*") {
            let (_dir, path) = temp_config(&content);
            prop_assert!(path.ends_with("sandstock.yaml"));
            let read_content = std::fs::read_to_string(&path).unwrap();
            prop_assert_eq!(content, read_content);
        }
    }
}
