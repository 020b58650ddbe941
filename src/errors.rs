//! Error types for the idea-islands application.
//!
//! This module defines the error kinds that can surface from the store,
//! the query surface and the peer synchronization layer.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the idea-islands application.
#[derive(Error, Debug)]
pub enum IslandError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Island was not found when performing an operation.
    #[error("Island not found: {id}")]
    NotFound { id: String },

    /// Input rejected before any mutation took place.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The peer could not be reached or answered with a non-success status.
    #[error("Remote peer unavailable: {message}")]
    RemoteUnavailable { message: String },

    /// The backing file could not be read or written.
    #[error("Storage failure at {path}: {message}")]
    Storage { path: PathBuf, message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{message}")]
    EditorError { message: String },
}

impl IslandError {
    pub fn not_found(id: impl Into<String>) -> Self {
        IslandError::NotFound { id: id.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        IslandError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        IslandError::RemoteUnavailable {
            message: message.into(),
        }
    }

    /// True when the failure came from the peer rather than local state.
    pub fn is_remote(&self) -> bool {
        matches!(self, IslandError::RemoteUnavailable { .. })
    }
}
