//! Copy jobs.
//!
//! A [`CopyJob`] binds a [`JobSpec`] to live stores and runs every copy in it
//! concurrently. One failing copy never stops the others; every failure is
//! collected into the returned [`JobReport`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::constants::TARGET_NAME;
use crate::core::copy::Copy;
use crate::core::domain::{CopyOutcome, CopyReport, JobReport};
use crate::core::spec::{CopySpec, JobSpec};
use crate::core::store::{Store, Vault};
use crate::core::types::SourceName;
use crate::error::{ConfigError, CopyFailure, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Apply,
    DryRun,
}

/// A fully resolved copy job.
pub struct CopyJob {
    target: Arc<dyn Store>,
    sources: BTreeMap<SourceName, Arc<dyn Store>>,
    copies: Vec<Arc<Copy>>,
}

impl std::fmt::Debug for CopyJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyJob")
            .field("target", &self.target.name())
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("copies", &self.copies)
            .finish()
    }
}

impl CopyJob {
    /// Connect to every Vault server in `spec` and resolve its copies.
    ///
    /// The target is connected first, then each source, then every copy is
    /// resolved against the complete set of sources.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any store fails to connect or any copy element
    /// is invalid. Nothing is copied in that case.
    pub async fn connect(spec: &JobSpec) -> Result<Self> {
        let target = Vault::connect(&spec.target, TARGET_NAME)
            .await
            .map_err(|e| ConfigError::Target(Box::new(e)))?;

        let mut sources: BTreeMap<SourceName, Arc<dyn Store>> = BTreeMap::new();
        for (name, store_spec) in &spec.sources {
            let source = Vault::connect(store_spec, name)
                .await
                .map_err(|e| ConfigError::Source {
                    name: name.clone(),
                    source: Box::new(e),
                })?;
            sources.insert(name.clone(), Arc::new(source));
        }

        Self::new(Arc::new(target), sources, &spec.copies)
    }

    /// Resolve `copies` against already connected stores.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Copy` naming the first invalid copy element
    /// (1-based).
    pub fn new(
        target: Arc<dyn Store>,
        sources: BTreeMap<SourceName, Arc<dyn Store>>,
        copies: &[CopySpec],
    ) -> Result<Self> {
        let copies = copies
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                Copy::from_spec(spec, &sources)
                    .map(Arc::new)
                    .map_err(|e| ConfigError::Copy {
                        index: i + 1,
                        source: Box::new(e),
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            target,
            sources,
            copies,
        })
    }

    pub fn target(&self) -> &Arc<dyn Store> {
        &self.target
    }

    /// Source stores by name.
    pub fn sources(&self) -> &BTreeMap<SourceName, Arc<dyn Store>> {
        &self.sources
    }

    pub fn copies(&self) -> &[Arc<Copy>] {
        &self.copies
    }

    /// Run every copy concurrently and wait for all of them.
    pub async fn execute(&self) -> JobReport {
        self.run(Mode::Apply).await
    }

    /// Check every copy for staleness concurrently without writing.
    pub async fn plan(&self) -> JobReport {
        self.run(Mode::DryRun).await
    }

    async fn run(&self, mode: Mode) -> JobReport {
        info!(copies = self.copies.len(), ?mode, "executing copy job");

        let handles: Vec<_> = self
            .copies
            .iter()
            .map(|copy| {
                let copy = Arc::clone(copy);
                let target = Arc::clone(&self.target);
                tokio::spawn(async move {
                    match mode {
                        Mode::Apply => copy.execute(target.as_ref()).await,
                        Mode::DryRun => copy.plan(target.as_ref()).await,
                    }
                })
            })
            .collect();

        let mut report = JobReport::default();
        for (i, (handle, copy)) in handles.into_iter().zip(&self.copies).enumerate() {
            let index = i + 1;
            let name = copy.name();
            let result = handle
                .await
                .unwrap_or_else(|e| Err(Error::Task(e.to_string())));

            match result {
                Ok(outcome) => report.completed.push(CopyReport {
                    index,
                    name,
                    outcome,
                }),
                Err(source) => {
                    warn!(copy = %name, index, error = %source, "copy failed");
                    report.errors.push(CopyFailure {
                        index,
                        name,
                        source,
                    });
                }
            }
        }

        info!(
            updated = report.count(CopyOutcome::Updated),
            up_to_date = report.count(CopyOutcome::UpToDate),
            stale = report.count(CopyOutcome::Stale),
            failed = report.errors.len(),
            "copy job finished"
        );
        report
    }
}
