//! Constants used throughout hvc.
//!
//! Centralizes magic strings and default values.

/// Mount point assumed when a copy element omits one.
pub const DEFAULT_MOUNT_POINT: &str = "kv";

/// Name given to the target store.
pub const TARGET_NAME: &str = "_target";

/// Metadata field carrying a secret's freshness timestamp.
pub const UPDATED_TIME_FIELD: &str = "updated_time";

/// Field wrapping the key/value payload of a KV v2 secret.
pub const DATA_FIELD: &str = "data";

/// Environment variable controlling the log filter.
pub const LOG_ENV: &str = "HVC_LOG";

/// Environment variable holding a fallback Vault token.
pub const VAULT_TOKEN_ENV: &str = "VAULT_TOKEN";

/// Header carrying the Vault token on every request.
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Mount point of the Kubernetes auth method when none is given.
pub const DEFAULT_KUBERNETES_MOUNT: &str = "kubernetes";

/// Service account token location inside a pod.
pub const DEFAULT_KUBERNETES_JWT_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Per-request timeout for Vault stores, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
