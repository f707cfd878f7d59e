//! Error types for tangle operations.

use std::io;
use thiserror::Error;

/// The error type for tangle operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The issue source rejected or failed a request. Fetch is not retried;
    /// the whole run fails.
    #[error("Jira request failed: {0}")]
    Source(String),

    /// Transport-level failure talking to the issue source.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file (de)serialization failure.
    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A specialized Result type for tangle operations.
pub type Result<T> = std::result::Result<T, Error>;
