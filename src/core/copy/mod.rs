//! A single target secret and how to bring it up to date.
//!
//! Each run of a [`Copy`] reads the target's freshness, compares it with the
//! freshness of its sources, and rewrites the target only when a source is
//! strictly newer. The steps run in order and stop at the first failure, so
//! a failed source read never leads to a partial write.

mod source;
mod value;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

pub use source::CopySource;
pub use value::CopyValue;

use crate::core::constants::{DATA_FIELD, DEFAULT_MOUNT_POINT};
use crate::core::domain::CopyOutcome;
use crate::core::spec::{non_empty, CopySpec, CopyValueSpec};
use crate::core::store::{data_path, epoch, metadata_path, Store};
use crate::core::types::{SecretData, SourceName, Timestamp};
use crate::error::{ConfigError, Result};

/// One secret in the target store and the source it is copied from.
#[derive(Debug, Clone)]
pub struct Copy {
    mount_point: String,
    path: String,
    source: CopySource,
}

impl Copy {
    pub fn new(mount_point: impl Into<String>, path: impl Into<String>, source: CopySource) -> Self {
        Self {
            mount_point: mount_point.into(),
            path: path.into(),
            source,
        }
    }

    /// Resolve a copy element against the job's source stores.
    ///
    /// Omitted mount points default to `kv`. Omitted source paths default to
    /// the target path, and omitted value keys default to the target key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the target path is missing, if both or neither
    /// of `secret` and `values` are given, or if a reference names a source
    /// that does not exist.
    pub fn from_spec(
        spec: &CopySpec,
        sources: &BTreeMap<SourceName, Arc<dyn Store>>,
    ) -> std::result::Result<Self, ConfigError> {
        let mount_point = non_empty(&spec.mount_point).unwrap_or(DEFAULT_MOUNT_POINT);
        let path = non_empty(&spec.path).ok_or(ConfigError::MissingPath)?;
        let name = format!("{}/{}", mount_point, path);

        let values = spec.values.as_ref().filter(|v| !v.is_empty());
        let source = match (&spec.secret, values) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingSource(name)),
            (None, None) => return Err(ConfigError::MissingSource(name)),
            (Some(secret), None) => {
                let store = sources
                    .get(&secret.source)
                    .ok_or_else(|| ConfigError::UnknownSecretSource(secret.source.clone()))?;
                CopySource::Secret(resolve_value(secret, store, path, ""))
            }
            (None, Some(values)) => {
                let mut resolved = BTreeMap::new();
                for (target_key, value) in values {
                    let store = sources.get(&value.source).ok_or_else(|| {
                        ConfigError::UnknownValueSource {
                            key: target_key.clone(),
                            source_name: value.source.clone(),
                        }
                    })?;
                    resolved.insert(
                        target_key.clone(),
                        resolve_value(value, store, path, target_key),
                    );
                }
                CopySource::Values(resolved)
            }
        };

        Ok(Self::new(mount_point, path, source))
    }

    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source(&self) -> &CopySource {
        &self.source
    }

    /// Canonical name, e.g. `kv/app`.
    pub fn name(&self) -> String {
        format!("{}/{}", self.mount_point, self.path)
    }

    /// Freshness of the target secret.
    ///
    /// A target that does not exist yet reports the epoch, so any source
    /// newer than the epoch makes it stale.
    ///
    /// # Errors
    ///
    /// Returns a store error if the metadata read fails, or a timestamp error
    /// if the stored `updated_time` cannot be parsed.
    pub async fn target_update_time(&self, target: &dyn Store) -> Result<Timestamp> {
        let metadata = target
            .read(&metadata_path(&self.mount_point, &self.path))
            .await?;

        match metadata {
            Some(secret) => secret.updated_time(&self.name()),
            None => {
                debug!(copy = %self.name(), "target secret does not exist");
                Ok(epoch())
            }
        }
    }

    /// Whether any source is strictly newer than `target_time`.
    ///
    /// # Errors
    ///
    /// Propagates failures from reading source metadata.
    pub async fn needs_copy(&self, target_time: Timestamp) -> Result<bool> {
        let source_time = self.source.updated_time().await?;
        debug!(
            copy = %self.name(),
            %target_time,
            %source_time,
            "compared freshness"
        );
        Ok(target_time < source_time)
    }

    /// Write the source data to the target secret.
    ///
    /// # Errors
    ///
    /// Fails without writing if any source value cannot be retrieved, or with
    /// a store error if the write is rejected.
    pub async fn update_target(&self, target: &dyn Store) -> Result<()> {
        let values = self.source.retrieve_values().await?;
        let keys = values.len();

        let mut body = SecretData::new();
        body.insert(DATA_FIELD.to_string(), Value::Object(values));
        target
            .write(&data_path(&self.mount_point, &self.path), body)
            .await?;

        info!(copy = %self.name(), keys, "updated target secret");
        Ok(())
    }

    /// Bring the target secret up to date.
    ///
    /// # Errors
    ///
    /// Returns the first failure among the target read, the source reads and
    /// the target write.
    pub async fn execute(&self, target: &dyn Store) -> Result<CopyOutcome> {
        let target_time = self.target_update_time(target).await?;
        if !self.needs_copy(target_time).await? {
            debug!(copy = %self.name(), "target secret is up to date");
            return Ok(CopyOutcome::UpToDate);
        }

        self.update_target(target).await?;
        Ok(CopyOutcome::Updated)
    }

    /// Report whether the target secret is stale without writing anything.
    ///
    /// # Errors
    ///
    /// Same as [`Copy::execute`], minus the write.
    pub async fn plan(&self, target: &dyn Store) -> Result<CopyOutcome> {
        let target_time = self.target_update_time(target).await?;
        if self.needs_copy(target_time).await? {
            Ok(CopyOutcome::Stale)
        } else {
            Ok(CopyOutcome::UpToDate)
        }
    }
}

fn resolve_value(
    spec: &CopyValueSpec,
    store: &Arc<dyn Store>,
    target_path: &str,
    target_key: &str,
) -> CopyValue {
    CopyValue::new(
        Arc::clone(store),
        non_empty(&spec.mount_point).unwrap_or(DEFAULT_MOUNT_POINT),
        non_empty(&spec.path).unwrap_or(target_path),
        non_empty(&spec.key).unwrap_or(target_key),
    )
    .with_source(spec.source.clone())
}
