//! Error types for Routine Builder
//!
//! This module defines the error types used across the catalog, selection,
//! chat, and relay layers, using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Routine Builder operations
///
/// Library functions return [`Result`], which wraps these variants in
/// `anyhow::Error` so callers can attach context while still being able to
/// downcast to a specific failure.
#[derive(Error, Debug)]
pub enum RoutineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog loading or lookup errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Selection set errors (unknown product, bad input)
    #[error("Selection error: {0}")]
    Selection(String),

    /// Selection slot storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Relay server errors (bind, serve)
    #[error("Relay error: {0}")]
    Relay(String),

    /// Upstream chat-completion API errors
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Missing credential for the upstream API
    #[error("Missing credential: {0}")]
    MissingCredentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Routine Builder operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
