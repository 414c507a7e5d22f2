//! hvc - Efficiently copies secrets from one or more source Vaults to a
//! target Vault.
//!
//! A copy job names a target Vault, any number of source Vaults, and a list
//! of copies. Each copy assembles one target secret either from individual
//! values spread across source secrets or from one whole source secret, and
//! writes it only when some source is newer than the target.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── copy          # Run a copy job
//! │   ├── validate      # Check a job file offline
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── spec/         # Job file model and loading
//!     ├── store/        # Secret stores
//!     │   ├── mod       # Store trait
//!     │   ├── vault     # Vault HTTP API implementation
//!     │   └── memory    # In-memory KV v2 implementation
//!     ├── copy/         # One copy: freshness check and write
//!     │   ├── value     # Reference to a source secret
//!     │   └── source    # Values or whole-secret source
//!     ├── job           # Concurrent execution of all copies
//!     └── domain/       # Job reports
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use hvc::{CopyJob, JobSpec, MemoryStore, Store};
//!
//! # async fn run() -> hvc::error::Result<()> {
//! let spec = JobSpec::from_json(r#"{
//!     "target": { "address": "http://127.0.0.1:8200" },
//!     "sources": { "s1": { "address": "http://127.0.0.1:8201" } },
//!     "copies": [{ "path": "app", "secret": { "source": "s1" } }]
//! }"#)?;
//!
//! let mut sources: BTreeMap<String, Arc<dyn Store>> = BTreeMap::new();
//! sources.insert("s1".into(), Arc::new(MemoryStore::new("s1")));
//! let job = CopyJob::new(Arc::new(MemoryStore::new("target")), sources, &spec.copies)?;
//!
//! let report = job.execute().await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::copy::{Copy, CopySource, CopyValue};
pub use crate::core::domain::{CopyOutcome, CopyReport, JobReport};
pub use crate::core::job::CopyJob;
pub use crate::core::spec::JobSpec;
pub use crate::core::store::{MemoryStore, Store, Vault};
