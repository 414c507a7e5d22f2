//! Results of running a copy job.

use crate::error::CopyFailure;

/// What happened to one target secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The target was older than its sources and has been rewritten.
    Updated,
    /// The target was at least as fresh as its sources. Nothing was written.
    UpToDate,
    /// The target is older than its sources. Reported by dry runs only.
    Stale,
}

impl std::fmt::Display for CopyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Updated => "updated",
            Self::UpToDate => "up to date",
            Self::Stale => "stale",
        };
        f.write_str(label)
    }
}

/// Outcome of one successful copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    /// 1-based position of the copy in the job
    pub index: usize,
    /// Canonical name of the target secret
    pub name: String,
    pub outcome: CopyOutcome,
}

/// Aggregate result of a job run, ordered by copy index.
#[derive(Debug, Default)]
pub struct JobReport {
    /// Copies that completed
    pub completed: Vec<CopyReport>,
    /// Copies that failed
    pub errors: Vec<CopyFailure>,
}

impl JobReport {
    /// True when no copy failed.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of copies run.
    pub fn total(&self) -> usize {
        self.completed.len() + self.errors.len()
    }

    /// Number of completed copies with the given outcome.
    pub fn count(&self, outcome: CopyOutcome) -> usize {
        self.completed
            .iter()
            .filter(|r| r.outcome == outcome)
            .count()
    }
}
