//! Error types for Fences.
//!
//! This module provides the unified error type used at the application
//! boundary (CLI, runtime). Feature modules keep their own narrower errors
//! and convert into [`FencesError`] with `?`.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::modules::fences::state::StoreError;

/// Errors that can occur during application execution.
///
/// Serializes as `{ "kind": ..., "message": ... }` so CLI `--json` output
/// can report failures in a structured way.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum FencesError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// The fence document could not be loaded or saved.
    #[error("Store error: {0}")]
    StoreError(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// No fence with the given id exists.
    #[error("Fence not found: {0}")]
    FenceNotFound(String),
    /// A property update was rejected.
    #[error("Property error: {0}")]
    PropertyError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for FencesError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for FencesError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<StoreError> for FencesError {
    fn from(err: StoreError) -> Self { Self::StoreError(err.to_string()) }
}

impl From<ConfigError> for FencesError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<String> for FencesError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for FencesError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}
