//! Test support utilities for hvc integration tests.
//!
//! Provides an isolated job directory, helper commands and an in-process
//! fake Vault server.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fake_vault;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fake_vault::FakeVault;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with an isolated temp directory for job files.
///
/// No process-global state is mutated. Child processes use `.current_dir()`
/// so tests can safely run in parallel.
pub struct Test {
    /// Directory holding job files and JWT files for the test.
    pub dir: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Write `contents` to `name` inside the test directory.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write test file");
        path
    }

    /// Write a JSON job file and return its path.
    pub fn job(&self, job: &serde_json::Value) -> PathBuf {
        self.write(
            "job.json",
            &serde_json::to_string_pretty(job).expect("failed to encode job"),
        )
    }
}
