//! Error types.
//!
//! A top-level [`Error`] wraps one enum per failure domain. Configuration
//! errors stop a job before any copy runs; store and secret errors abort a
//! single copy and are reported through [`CopyFailure`].

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    /// At least one copy of a job failed. Details are in the job report.
    #[error("failed to copy secrets: {failed} of {total} copies failed")]
    JobFailed { failed: usize, total: usize },

    /// A copy task panicked or was aborted before reporting.
    #[error("copy task failed: {0}")]
    Task(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Job file and copy definition errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read copy job specification {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode JSON copy job specification: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to decode TOML copy job specification: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("copy element must provide a target secret path")]
    MissingPath,

    #[error("copy element {0} cannot contain both secret and values")]
    ConflictingSource(String),

    #[error("copy element {0} must contain either secret or values")]
    MissingSource(String),

    #[error("secret is referencing a non-existing source Vault {0}")]
    UnknownSecretSource(String),

    #[error("secret value for target secret key {key} is referencing a non-existing source Vault {source_name}")]
    UnknownValueSource { key: String, source_name: String },

    #[error("invalid address {address:?} for Vault {store}: {reason}")]
    InvalidAddress {
        store: String,
        address: String,
        reason: String,
    },

    #[error("failed to initialize target Vault: {0}")]
    Target(#[source] Box<Error>),

    #[error("failed to initialize source Vault {name:?}: {source}")]
    Source {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to resolve copy {index}: {source}")]
    Copy {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },
}

/// Store connection and I/O errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to build HTTP client for Vault {store}: {reason}")]
    Client { store: String, reason: String },

    #[error("no Vault token obtained for {0}")]
    MissingToken(String),

    #[error("failed to authenticate with Vault server {store}: {reason}")]
    Login { store: String, reason: String },

    #[error("failed to read {path} from {store}: {reason}")]
    Read {
        store: String,
        path: String,
        reason: String,
    },

    #[error("failed to write {path} to {store}: {reason}")]
    Write {
        store: String,
        path: String,
        reason: String,
    },
}

/// Errors about the content of a secret once it has been read.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("secret {0} not found")]
    NotFound(String),

    #[error("secret {secret} does not contain key {key}")]
    KeyNotFound { secret: String, key: String },

    #[error("secret {0} has no data payload")]
    MissingPayload(String),

    #[error("secret {0} metadata has no updated_time")]
    MissingTimestamp(String),

    #[error("failed to parse the retrieved value for the updated_time {value} of {secret}: {source}")]
    InvalidTimestamp {
        secret: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// A failed copy, tagged with its position in the job and its canonical name.
#[derive(Error, Debug)]
#[error("failed to execute copy {index} ({name}): {source}")]
pub struct CopyFailure {
    pub index: usize,
    pub name: String,
    #[source]
    pub source: Error,
}

pub type Result<T> = std::result::Result<T, Error>;
