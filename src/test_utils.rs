//! Shared test utilities for hcl-index.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::diagnostics::DiagnosticsSink;
use crate::index::{FileIndex, WorkspaceIndex};
use crate::syntax::{HclParser, ParseError};

/// Creates a temporary workspace directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the workspace subdirectory
///
/// The crawler skips hidden directories, and temp directories can live under
/// paths like `/tmp/.tmpXXXXX`, so files go into a non-hidden `workspace`
/// subdirectory.
///
/// # Example
///
/// ```ignore
/// use crate::test_utils::create_test_workspace_dir;
///
/// let (_temp_dir, root) = create_test_workspace_dir();
/// std::fs::write(root.join("main.tf"), "variable \"x\" {}").unwrap();
/// ```
pub fn create_test_workspace_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path().join("workspace");
    fs::create_dir(&root).expect("Failed to create workspace subdirectory");
    (temp_dir, root)
}

/// Indexes `src` as if it were the content of `file`. Panics on parse errors.
pub fn file_index(file: &str, src: &str) -> FileIndex {
    FileIndex::from_source(&HclParser, Path::new(file), src).expect("test source should parse")
}

/// A workspace index over `(file, source)` pairs.
pub fn workspace_index(files: &[(&str, &str)]) -> WorkspaceIndex {
    let mut index = WorkspaceIndex::new();
    index.update_many(files.iter().map(|(file, src)| file_index(file, src)));
    index
}

/// A diagnostics sink that remembers every publish.
#[derive(Debug, Default)]
pub struct RecordingSink {
    published: Mutex<Vec<(PathBuf, Vec<ParseError>)>>,
}

impl RecordingSink {
    pub fn published(&self) -> Vec<(PathBuf, Vec<ParseError>)> {
        self.published.lock().expect("sink lock poisoned").clone()
    }

    /// The diagnostics most recently published for `file`.
    pub fn last_for(&self, file: &Path) -> Option<Vec<ParseError>> {
        self.published()
            .into_iter()
            .rev()
            .find(|(path, _)| path == file)
            .map(|(_, errors)| errors)
    }
}

impl DiagnosticsSink for RecordingSink {
    fn publish(&self, file: &Path, errors: Vec<ParseError>) {
        self.published
            .lock()
            .expect("sink lock poisoned")
            .push((file.to_path_buf(), errors));
    }
}
