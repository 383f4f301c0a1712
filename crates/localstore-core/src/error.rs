//! Error types for localstore-core
//!
//! Two layers: `KvError` for backend failures, `StoreError` for store lifecycle
//! and configuration problems. Reads and writes on an initialized store never
//! return errors; backend failures there are logged and absorbed.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a persistent key-value backend
#[derive(Error, Debug)]
pub enum KvError {
    #[error("SQLite backend error: {message}")]
    Sqlite {
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to read store file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write store file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode store file {path}")]
    JsonEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Backend lock poisoned")]
    LockPoisoned,

    #[error("Backend unavailable: {message}")]
    Unavailable { message: String },
}

impl KvError {
    pub(crate) fn sqlite(message: impl Into<String>) -> impl FnOnce(rusqlite::Error) -> Self {
        let message = message.into();
        move |source| KvError::Sqlite { message, source }
    }
}

/// Core error type for localstore operations
#[derive(Error, Debug)]
pub enum StoreError {
    // ===================
    // Lifecycle Errors
    // ===================
    #[error("Local store not initialized")]
    NotInitialized,

    #[error("Local store already initialized")]
    AlreadyInitialized,

    #[error("No tokio runtime available to run the write-back worker")]
    NoRuntime,

    #[error("Write-back worker has stopped")]
    WriterClosed,

    // ===================
    // Lookup Errors
    // ===================
    #[error("Unknown key: {key}")]
    UnknownKey { key: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to read configuration: {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON configuration: {message}")]
    ConfigJson {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML configuration: {message}")]
    ConfigToml {
        message: String,
        #[source]
        source: toml::de::Error,
    },

    // ===================
    // Backend Errors
    // ===================
    #[error(transparent)]
    Kv(#[from] KvError),
}

impl StoreError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        StoreError::InvalidConfig {
            message: message.into(),
        }
    }
}
