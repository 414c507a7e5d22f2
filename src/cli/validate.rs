//! Validate command - check a job file offline.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::cli::output;
use crate::core::constants::TARGET_NAME;
use crate::core::job::CopyJob;
use crate::core::spec::JobSpec;
use crate::core::store::{MemoryStore, Store};
use crate::error::Result;

/// Load the job file at `job` and resolve its copies.
///
/// Copies are resolved against empty in-memory stand-ins for the declared
/// stores, so every copy element gets the same checks a real run applies
/// before any network access.
pub fn execute(job: &Path) -> Result<()> {
    info!(job = %job.display(), "validating copy job");

    let spec = JobSpec::load(job)?;

    let sources: BTreeMap<String, Arc<dyn Store>> = spec
        .sources
        .keys()
        .map(|name| {
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new(name.clone()));
            (name.clone(), store)
        })
        .collect();
    let copy_job = CopyJob::new(Arc::new(MemoryStore::new(TARGET_NAME)), sources, &spec.copies)?;

    output::success(&format!(
        "{} valid ({} copies, {} sources)",
        job.display(),
        copy_job.copies().len(),
        copy_job.sources().len()
    ));
    Ok(())
}
