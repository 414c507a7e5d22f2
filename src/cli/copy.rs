//! Copy command - bring every target secret in a job up to date.

use std::path::Path;

use tracing::info;

use crate::cli::output;
use crate::core::domain::CopyOutcome;
use crate::core::job::CopyJob;
use crate::core::spec::JobSpec;
use crate::error::{Error, Result};

/// Run the copy job described by the file at `job`.
pub fn execute(job: &Path, dry_run: bool) -> Result<()> {
    info!(job = %job.display(), dry_run, "running copy");

    let spec = JobSpec::load(job)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(async {
        let job = CopyJob::connect(&spec).await?;
        let report = if dry_run {
            job.plan().await
        } else {
            job.execute().await
        };
        Ok::<_, Error>(report)
    })?;

    for entry in &report.completed {
        let line = format!("{} {}", entry.name, entry.outcome);
        match entry.outcome {
            CopyOutcome::Updated => output::success(&line),
            CopyOutcome::Stale => output::warn(&line),
            CopyOutcome::UpToDate => output::dimmed(&format!("· {}", line)),
        }
    }
    for failure in &report.errors {
        output::error(&failure.to_string());
    }

    if !report.is_success() {
        return Err(Error::JobFailed {
            failed: report.errors.len(),
            total: report.total(),
        });
    }

    Ok(())
}
