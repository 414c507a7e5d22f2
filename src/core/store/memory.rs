//! In-process KV v2 store.
//!
//! Mirrors the subset of KV v2 behavior hvc relies on: metadata reads carry
//! `updated_time`, data reads wrap the payload in `data`, and writes to a
//! data path stamp the secret with the current time. Supports failure
//! injection and read counting so copy behavior can be observed.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::trace;

use super::{Secret, Store};
use crate::core::constants::{DATA_FIELD, UPDATED_TIME_FIELD};
use crate::core::types::{SecretData, Timestamp};
use crate::error::{Result, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    data: SecretData,
    updated_time: String,
    version: u64,
}

#[derive(Debug, Default)]
struct State {
    secrets: HashMap<(String, String), Entry>,
    reads: HashMap<String, usize>,
    writes: HashMap<String, usize>,
    failing_reads: HashSet<String>,
    failing_writes: HashSet<String>,
}

/// Which half of a KV v2 secret a path addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Metadata,
    Data,
}

/// Thread-safe in-memory store.
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave State half-updated.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a secret with an explicit freshness timestamp.
    pub fn insert(&self, mount_point: &str, path: &str, data: SecretData, updated_time: Timestamp) {
        self.insert_raw(
            mount_point,
            path,
            data,
            &updated_time.to_rfc3339_opts(SecondsFormat::Nanos, true),
        );
    }

    /// Seed a secret with an arbitrary `updated_time` string.
    pub fn insert_raw(&self, mount_point: &str, path: &str, data: SecretData, updated_time: &str) {
        let mut state = self.state();
        let key = (mount_point.to_string(), path.to_string());
        let version = state.secrets.get(&key).map_or(1, |e| e.version + 1);
        state.secrets.insert(
            key,
            Entry {
                data,
                updated_time: updated_time.to_string(),
                version,
            },
        );
    }

    /// Current payload of a secret, if present.
    pub fn get(&self, mount_point: &str, path: &str) -> Option<SecretData> {
        self.state()
            .secrets
            .get(&(mount_point.to_string(), path.to_string()))
            .map(|e| e.data.clone())
    }

    /// Make every read of `path` fail.
    pub fn fail_reads_of(&self, path: impl Into<String>) {
        self.state().failing_reads.insert(path.into());
    }

    /// Make every write to `path` fail.
    pub fn fail_writes_of(&self, path: impl Into<String>) {
        self.state().failing_writes.insert(path.into());
    }

    /// Number of reads issued for `path`, successful or not.
    pub fn reads_of(&self, path: &str) -> usize {
        self.state().reads.get(path).copied().unwrap_or(0)
    }

    /// Number of writes issued for `path`, successful or not.
    pub fn writes_of(&self, path: &str) -> usize {
        self.state().writes.get(path).copied().unwrap_or(0)
    }

    /// Total number of writes issued against this store.
    pub fn total_writes(&self) -> usize {
        self.state().writes.values().sum()
    }
}

/// Split `kv/metadata/app` into (`Metadata`, `kv`, `app`).
fn split_path(path: &str) -> Option<(Kind, &str, &str)> {
    let metadata = path.find("/metadata/").map(|i| (i, Kind::Metadata, "/metadata/".len()));
    let data = path.find("/data/").map(|i| (i, Kind::Data, "/data/".len()));

    let (index, kind, len) = match (metadata, data) {
        (Some(m), Some(d)) => {
            if m.0 < d.0 {
                m
            } else {
                d
            }
        }
        (Some(m), None) => m,
        (None, Some(d)) => d,
        (None, None) => return None,
    };

    let secret_path = &path[index + len..];
    if secret_path.is_empty() {
        return None;
    }
    Some((kind, &path[..index], secret_path))
}

fn into_map(value: Value) -> SecretData {
    match value {
        Value::Object(map) => map,
        _ => SecretData::new(),
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self, path: &str) -> Result<Option<Secret>> {
        let mut state = self.state();
        *state.reads.entry(path.to_string()).or_default() += 1;
        trace!(store = %self.name, path, "memory read");

        if state.failing_reads.contains(path) {
            return Err(StoreError::Read {
                store: self.name.clone(),
                path: path.to_string(),
                reason: "injected failure".to_string(),
            }
            .into());
        }

        let Some((kind, mount_point, secret_path)) = split_path(path) else {
            return Ok(None);
        };
        let Some(entry) = state
            .secrets
            .get(&(mount_point.to_string(), secret_path.to_string()))
        else {
            return Ok(None);
        };

        let body = match kind {
            Kind::Metadata => json!({
                UPDATED_TIME_FIELD: entry.updated_time,
                "current_version": entry.version,
            }),
            Kind::Data => json!({
                DATA_FIELD: entry.data,
                "metadata": { "version": entry.version },
            }),
        };
        Ok(Some(Secret::new(into_map(body))))
    }

    async fn write(&self, path: &str, mut data: SecretData) -> Result<Option<Secret>> {
        let write_error = |reason: &str| StoreError::Write {
            store: self.name.clone(),
            path: path.to_string(),
            reason: reason.to_string(),
        };

        {
            let mut state = self.state();
            *state.writes.entry(path.to_string()).or_default() += 1;
            if state.failing_writes.contains(path) {
                return Err(write_error("injected failure").into());
            }
        }

        let (mount_point, secret_path) = match split_path(path) {
            Some((Kind::Data, mount_point, secret_path)) => (mount_point, secret_path),
            _ => return Err(write_error("only KV v2 data paths are writable").into()),
        };
        let payload = match data.remove(DATA_FIELD) {
            Some(Value::Object(payload)) => payload,
            _ => return Err(write_error("request body has no data object").into()),
        };

        trace!(store = %self.name, path, keys = payload.len(), "memory write");
        self.insert(mount_point, secret_path, payload, Utc::now());

        let version = self
            .state()
            .secrets
            .get(&(mount_point.to_string(), secret_path.to_string()))
            .map_or(1, |e| e.version);
        Ok(Some(Secret::new(into_map(json!({ "version": version })))))
    }
}
