//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use chrono::{DateTime, Utc};

/// Key/value payload of a secret as returned by a store.
pub type SecretData = serde_json::Map<String, serde_json::Value>;

/// Freshness of a secret. The Unix epoch stands for "never written".
pub type Timestamp = DateTime<Utc>;

/// Name of a source store as declared in the job file.
pub type SourceName = String;

/// A key inside the target secret.
pub type TargetKey = String;
