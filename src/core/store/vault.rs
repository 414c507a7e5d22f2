//! HashiCorp Vault store over the HTTP API.
//!
//! Only the calls hvc needs are implemented: logical reads and writes under
//! `/v1/` and the Kubernetes auth login.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::{Secret, Store};
use crate::core::constants::{
    DEFAULT_KUBERNETES_JWT_PATH, DEFAULT_KUBERNETES_MOUNT, DEFAULT_TIMEOUT_SECS, VAULT_TOKEN_ENV,
    VAULT_TOKEN_HEADER,
};
use crate::core::spec::{KubernetesLogin, StoreSpec};
use crate::core::types::SecretData;
use crate::error::{ConfigError, Result, StoreError};

/// Body of a Vault API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    data: Option<SecretData>,
    #[serde(default)]
    auth: Option<ApiAuth>,
}

#[derive(Debug, Deserialize)]
struct ApiAuth {
    client_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrors {
    #[serde(default)]
    errors: Vec<String>,
}

/// An authenticated connection to one Vault server.
pub struct Vault {
    name: String,
    address: String,
    client: Client,
    token: Zeroizing<String>,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("name", &self.name)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Vault {
    /// Connect and authenticate to the Vault server described by `spec`.
    ///
    /// The token comes from `login.token`, then a Kubernetes login, then the
    /// `VAULT_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAddress` for an unusable address,
    /// `StoreError::Login` if the Kubernetes login fails, or
    /// `StoreError::MissingToken` if no token could be obtained.
    pub async fn connect(spec: &StoreSpec, name: &str) -> Result<Self> {
        let address = normalize_address(&spec.address, name)?;
        let timeout = Duration::from_secs(spec.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Client {
                store: name.to_string(),
                reason: e.to_string(),
            })?;

        let mut vault = Self {
            name: name.to_string(),
            address,
            client,
            token: Zeroizing::new(String::new()),
        };

        let login = spec.login.as_ref();
        if let Some(token) = login.and_then(|l| l.token.as_deref()).filter(|t| !t.is_empty()) {
            vault.token = Zeroizing::new(token.to_string());
        } else if let Some(kubernetes) = login.and_then(|l| l.kubernetes.as_ref()) {
            vault.token = vault.kubernetes_login(kubernetes).await?;
        } else if let Ok(token) = std::env::var(VAULT_TOKEN_ENV) {
            vault.token = Zeroizing::new(token);
        }

        if vault.token.is_empty() {
            return Err(StoreError::MissingToken(name.to_string()).into());
        }

        info!(store = %vault.name, address = %vault.address, "connected to vault");
        Ok(vault)
    }

    /// Server address without a trailing slash.
    pub fn address(&self) -> &str {
        &self.address
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.address, path.trim_start_matches('/'))
    }

    async fn kubernetes_login(&self, login: &KubernetesLogin) -> Result<Zeroizing<String>> {
        let login_error = |reason: String| StoreError::Login {
            store: self.name.clone(),
            reason,
        };

        let jwt_path = login.jwt_path.as_deref().unwrap_or(DEFAULT_KUBERNETES_JWT_PATH);
        let mount = login
            .mount_point
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_KUBERNETES_MOUNT);
        debug!(store = %self.name, jwt_path, mount, role = %login.role, "kubernetes login");

        let jwt = Zeroizing::new(
            tokio::fs::read_to_string(jwt_path)
                .await
                .map_err(|e| login_error(format!("failed to read {}: {}", jwt_path, e)))?,
        );

        let response = self
            .client
            .post(self.url(&format!("auth/{}/login", mount)))
            .json(&json!({ "role": login.role, "jwt": jwt.trim() }))
            .send()
            .await
            .map_err(|e| login_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(login_error(describe_failure(response).await).into());
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| login_error(e.to_string()))?;
        let auth = body
            .auth
            .ok_or_else(|| login_error("response carried no auth block".to_string()))?;

        Ok(Zeroizing::new(auth.client_token))
    }
}

fn normalize_address(address: &str, name: &str) -> Result<String> {
    let invalid = |reason: String| ConfigError::InvalidAddress {
        store: name.to_string(),
        address: address.to_string(),
        reason,
    };

    let url = reqwest::Url::parse(address).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())).into());
    }
    Ok(address.trim_end_matches('/').to_string())
}

/// Render a non-success response as `"<status>: <errors>"`.
async fn describe_failure(response: Response) -> String {
    let status = response.status();
    let errors: ApiErrors = response.json().await.unwrap_or_default();
    if errors.errors.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, errors.errors.join("; "))
    }
}

#[async_trait]
impl Store for Vault {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self, path: &str) -> Result<Option<Secret>> {
        let read_error = |reason: String| StoreError::Read {
            store: self.name.clone(),
            path: path.to_string(),
            reason,
        };

        debug!(store = %self.name, path, "vault read");
        let response = self
            .client
            .get(self.url(path))
            .header(VAULT_TOKEN_HEADER, self.token.as_str())
            .send()
            .await
            .map_err(|e| read_error(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(read_error(describe_failure(response).await).into());
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| read_error(e.to_string()))?;
        Ok(body.data.map(Secret::new))
    }

    async fn write(&self, path: &str, data: SecretData) -> Result<Option<Secret>> {
        let write_error = |reason: String| StoreError::Write {
            store: self.name.clone(),
            path: path.to_string(),
            reason,
        };

        debug!(store = %self.name, path, "vault write");
        let response = self
            .client
            .post(self.url(path))
            .header(VAULT_TOKEN_HEADER, self.token.as_str())
            .json(&data)
            .send()
            .await
            .map_err(|e| write_error(e.to_string()))?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(write_error(describe_failure(response).await).into());
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| write_error(e.to_string()))?;
        Ok(body.data.map(Secret::new))
    }
}
