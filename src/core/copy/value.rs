//! Reference to a source secret.

use std::sync::Arc;

use tracing::debug;

use crate::core::store::{data_path, metadata_path, Store};
use crate::core::types::{SecretData, SourceName, Timestamp};
use crate::error::{Result, SecretError};

/// Identity of a physical secret: source name, mount point and path.
pub(crate) type SecretId = (String, String, String);

/// One value (or, for whole-secret copies, one secret) in a source store.
#[derive(Clone)]
pub struct CopyValue {
    source: SourceName,
    store: Arc<dyn Store>,
    mount_point: String,
    path: String,
    key: String,
}

impl std::fmt::Debug for CopyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyValue")
            .field("source", &self.source)
            .field("store", &self.store.name())
            .field("mount_point", &self.mount_point)
            .field("path", &self.path)
            .field("key", &self.key)
            .finish()
    }
}

impl CopyValue {
    /// Reference a secret in `store`, identified by the store's own name.
    pub fn new(
        store: Arc<dyn Store>,
        mount_point: impl Into<String>,
        path: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            source: store.name().to_string(),
            store,
            mount_point: mount_point.into(),
            path: path.into(),
            key: key.into(),
        }
    }

    /// Identify the store by the name it was registered under in a job.
    ///
    /// Secrets are deduplicated by this name, so distinct stores must carry
    /// distinct source names even when their [`Store::name`] collides.
    pub fn with_source(mut self, source: impl Into<SourceName>) -> Self {
        self.source = source.into();
        self
    }

    /// Source name the store was registered under.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Store holding the secret.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Key of the value inside the secret. Unused for whole-secret copies.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Canonical name, e.g. `s1: kv/app`.
    pub fn name(&self) -> String {
        format!("{}: {}/{}", self.source, self.mount_point, self.path)
    }

    pub(crate) fn secret_id(&self) -> SecretId {
        (
            self.source.clone(),
            self.mount_point.clone(),
            self.path.clone(),
        )
    }

    /// Read the secret's metadata and parse its `updated_time`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read fails, `SecretError::NotFound` if
    /// the secret does not exist, or a timestamp error if the metadata is
    /// malformed.
    pub async fn updated_time(&self) -> Result<Timestamp> {
        let name = self.name();
        let secret = self
            .store
            .read(&metadata_path(&self.mount_point, &self.path))
            .await?
            .ok_or_else(|| SecretError::NotFound(name.clone()))?;

        let updated_time = secret.updated_time(&name)?;
        debug!(secret = %name, %updated_time, "source freshness");
        Ok(updated_time)
    }

    /// Read the secret's key/value payload.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read fails, `SecretError::NotFound` if
    /// the secret does not exist, or `SecretError::MissingPayload` if the
    /// response has no `data` object.
    pub async fn read_payload(&self) -> Result<SecretData> {
        let name = self.name();
        self.store
            .read(&data_path(&self.mount_point, &self.path))
            .await?
            .ok_or_else(|| SecretError::NotFound(name.clone()))?
            .into_payload(&name)
    }
}
