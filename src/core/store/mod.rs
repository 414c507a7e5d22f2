//! Secret store capability.
//!
//! A store exposes path-based reads and writes against a KV v2 secrets
//! engine. Paths are logical API paths such as `kv/metadata/app` or
//! `kv/data/app`; use [`metadata_path`] and [`data_path`] to build them.
//!
//! ## Adding a New Store
//!
//! 1. Implement the `Store` trait
//! 2. Add the implementation in a new file (e.g., `consul.rs`)
//! 3. Re-export from this module
//!
//! ## Concurrency
//!
//! A job hands the same store handle to every copy it runs, and those copies
//! run concurrently. Implementations must therefore tolerate any number of
//! simultaneous `read` and `write` calls; the engine never serializes them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::constants::{DATA_FIELD, UPDATED_TIME_FIELD};
use crate::core::types::{SecretData, Timestamp};
use crate::error::{Result, SecretError};

pub mod memory;
pub mod vault;

pub use memory::MemoryStore;
pub use vault::Vault;

/// Key/value store trait.
#[async_trait]
pub trait Store: Send + Sync {
    /// Name used in logs and errors, and as part of the secret dedup key.
    fn name(&self) -> &str;

    /// Read the secret at `path`.
    ///
    /// # Returns
    ///
    /// `None` when nothing exists at `path`. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Read` if the backend cannot be reached or
    /// rejects the request.
    async fn read(&self, path: &str) -> Result<Option<Secret>>;

    /// Write `data` as the request body at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the backend rejects the write.
    async fn write(&self, path: &str, data: SecretData) -> Result<Option<Secret>>;
}

/// A secret as returned by a store read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Secret {
    data: SecretData,
}

impl Secret {
    pub fn new(data: SecretData) -> Self {
        Self { data }
    }

    /// Raw data returned by the store.
    pub fn data(&self) -> &SecretData {
        &self.data
    }

    /// Parse the `updated_time` field of a metadata read.
    ///
    /// `name` identifies the secret in errors.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::MissingTimestamp` if the field is absent or not a
    /// string, or `SecretError::InvalidTimestamp` if it is not RFC 3339.
    pub fn updated_time(&self, name: &str) -> Result<Timestamp> {
        let value = self
            .data
            .get(UPDATED_TIME_FIELD)
            .and_then(|v| v.as_str())
            .ok_or_else(|| SecretError::MissingTimestamp(name.to_string()))?;

        parse_timestamp(value, name)
    }

    /// Consume the secret, returning its nested `data` object.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::MissingPayload` if the container is absent or
    /// is not an object.
    pub fn into_payload(mut self, name: &str) -> Result<SecretData> {
        match self.data.remove(DATA_FIELD) {
            Some(serde_json::Value::Object(map)) => Ok(map),
            _ => Err(SecretError::MissingPayload(name.to_string()).into()),
        }
    }
}

impl From<SecretData> for Secret {
    fn from(data: SecretData) -> Self {
        Self::new(data)
    }
}

/// Parse an RFC 3339 timestamp with up to nanosecond precision.
pub fn parse_timestamp(value: &str, name: &str) -> Result<Timestamp> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| {
            SecretError::InvalidTimestamp {
                secret: name.to_string(),
                value: value.to_string(),
                source,
            }
            .into()
        })
}

/// Timestamp standing for a secret that was never written.
pub fn epoch() -> Timestamp {
    DateTime::<Utc>::UNIX_EPOCH
}

/// API path of a secret's metadata.
pub fn metadata_path(mount_point: &str, path: &str) -> String {
    format!("{}/metadata/{}", mount_point, path)
}

/// API path of a secret's data.
pub fn data_path(mount_point: &str, path: &str) -> String {
    format!("{}/data/{}", mount_point, path)
}
