//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::path::Path;
use std::process::Output;

impl Test {
    /// Create an hvc command running inside the test directory.
    ///
    /// `VAULT_TOKEN` and `HVC_LOG` are cleared so the caller's environment
    /// never leaks into a test.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("hvc").expect("failed to find hvc binary");
        cmd.env_remove("VAULT_TOKEN");
        cmd.env_remove("HVC_LOG");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `hvc copy <job>`.
    pub fn copy(&self, job: &Path) -> Output {
        self.cmd()
            .arg("copy")
            .arg(job)
            .output()
            .expect("failed to run hvc copy")
    }

    /// Shortcut for `hvc copy --dry-run <job>`.
    pub fn copy_dry_run(&self, job: &Path) -> Output {
        self.cmd()
            .args(["copy", "--dry-run"])
            .arg(job)
            .output()
            .expect("failed to run hvc copy --dry-run")
    }

    /// Shortcut for `hvc validate <job>`.
    pub fn validate(&self, job: &Path) -> Output {
        self.cmd()
            .arg("validate")
            .arg(job)
            .output()
            .expect("failed to run hvc validate")
    }
}
