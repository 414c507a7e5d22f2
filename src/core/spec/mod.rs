//! Copy job specification.
//!
//! The declarative form of a job as written in a job file. Nothing here is
//! resolved: source names are plain strings and defaults are not applied
//! until [`crate::core::job::CopyJob`] binds the spec to live stores.
//!
//! Job files are JSON, or TOML when the file name ends in `.toml`.
//! Environment variables are expanded before decoding.

mod expand;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{SourceName, TargetKey};
use crate::error::{ConfigError, Result};

pub use expand::{expand_env, expand_with};

/// An entire copy job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobSpec {
    /// Store receiving the copied secrets.
    pub target: StoreSpec,
    /// Source stores by name.
    #[serde(default)]
    pub sources: BTreeMap<SourceName, StoreSpec>,
    /// One entry per target secret.
    #[serde(default)]
    pub copies: Vec<CopySpec>,
}

/// Connection details for one Vault server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreSpec {
    /// Scheme, host and port, e.g. `http://vault:8200`.
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<LoginSpec>,
    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// How to obtain a Vault token. Only one strategy should be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoginSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<KubernetesLogin>,
}

/// Kubernetes auth method login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KubernetesLogin {
    /// Role configured in the auth method.
    pub role: String,
    /// Service account token file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_path: Option<String>,
    /// Where the auth method is mounted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_point: Option<String>,
}

/// One target secret.
///
/// Exactly one of `values` or `secret` must be given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CopySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Target key to the value it is copied from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<BTreeMap<TargetKey, CopyValueSpec>>,
    /// A whole secret copied through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<CopyValueSpec>,
}

/// Reference to a source secret, or to one value inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CopyValueSpec {
    /// Name of an entry in [`JobSpec::sources`].
    pub source: SourceName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Treat an empty string the same as an omitted field.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl JobSpec {
    /// Load a job file, expanding environment variables first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` if the file cannot be read, or a
    /// decode error if its contents are malformed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading copy job specification");

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let expanded = expand_env(&contents);

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let spec = if is_toml {
            Self::from_toml(&expanded)?
        } else {
            Self::from_json(&expanded)?
        };

        debug!(
            sources = spec.sources.len(),
            copies = spec.copies.len(),
            "copy job specification loaded"
        );
        Ok(spec)
    }

    /// Decode a JSON job description. No expansion is performed.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input).map_err(ConfigError::Json)?)
    }

    /// Decode a TOML job description. No expansion is performed.
    pub fn from_toml(input: &str) -> Result<Self> {
        Ok(toml::from_str(input).map_err(ConfigError::Toml)?)
    }
}
