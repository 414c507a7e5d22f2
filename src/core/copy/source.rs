//! Where a target secret's data comes from.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use super::value::{CopyValue, SecretId};
use crate::core::store::epoch;
use crate::core::types::{SecretData, TargetKey, Timestamp};
use crate::error::{Result, SecretError};

/// Source of a target secret's data.
#[derive(Debug, Clone)]
pub enum CopySource {
    /// Each target key takes one value from some source secret.
    Values(BTreeMap<TargetKey, CopyValue>),
    /// The whole payload of one source secret, copied through unchanged.
    Secret(CopyValue),
}

impl CopySource {
    /// Latest `updated_time` across every source secret involved.
    ///
    /// A secret referenced by several target keys is read once.
    ///
    /// # Errors
    ///
    /// Fails on the first metadata read or parse failure, or if any source
    /// secret does not exist.
    pub async fn updated_time(&self) -> Result<Timestamp> {
        match self {
            Self::Values(values) => {
                let mut latest = epoch();
                for value in distinct_secrets(values) {
                    latest = latest.max(value.updated_time().await?);
                }
                Ok(latest)
            }
            Self::Secret(secret) => secret.updated_time().await,
        }
    }

    /// Assemble the data to write to the target secret.
    ///
    /// # Errors
    ///
    /// Fails if a source secret cannot be read, does not exist, or lacks a
    /// referenced key.
    pub async fn retrieve_values(&self) -> Result<SecretData> {
        match self {
            Self::Values(values) => {
                let mut payloads: HashMap<SecretId, SecretData> = HashMap::new();
                let mut data = SecretData::new();

                for (target_key, value) in values {
                    let id = value.secret_id();
                    if !payloads.contains_key(&id) {
                        let payload = value.read_payload().await?;
                        payloads.insert(id.clone(), payload);
                    }

                    let found = payloads
                        .get(&id)
                        .and_then(|payload| payload.get(value.key()))
                        .ok_or_else(|| SecretError::KeyNotFound {
                            secret: value.name(),
                            key: value.key().to_string(),
                        })?;
                    data.insert(target_key.clone(), found.clone());
                }

                debug!(
                    keys = data.len(),
                    secrets = payloads.len(),
                    "assembled source values"
                );
                Ok(data)
            }
            Self::Secret(secret) => secret.read_payload().await,
        }
    }
}

/// One value per distinct physical secret, in key order.
fn distinct_secrets(values: &BTreeMap<TargetKey, CopyValue>) -> Vec<&CopyValue> {
    let mut seen = HashSet::new();
    values
        .values()
        .filter(|value| seen.insert(value.secret_id()))
        .collect()
}
