//! Typed error hierarchy for the Kompaktor client.
//!
//! Three enums cover the three subsystems:
//! - `ClientError` — user actions: compaction requests and copying a result
//! - `StorageError` — durable key/value storage (consent, history)
//! - `ExportError` — text, PDF and image export

use std::path::PathBuf;
use thiserror::Error;

/// Message shown when the API cannot be reached at all.
pub const NETWORK_UNREACHABLE: &str = "Server unreachable. Please check your connection and try again.";

/// Message shown when the result could not be put on the clipboard.
pub const COPY_FAILED: &str = "Copying to the clipboard failed.";

/// Fallback when the server reported a failure without a usable message.
pub const GENERIC_REQUEST_FAILURE: &str = "An error occurred.";

/// Errors from a user action (text or file submit, copy).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Empty input or no file selected. Shown inline, nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The request never produced a response.
    #[error("{}", NETWORK_UNREACHABLE)]
    Network { detail: String },

    /// The server answered but reported a failure.
    #[error("{message}")]
    Request { status: Option<u16>, message: String },

    #[error("A compaction is already running")]
    Busy,

    #[error("{}", COPY_FAILED)]
    Clipboard { detail: String },
}

impl ClientError {
    /// Build a request error, falling back to a generic message when the
    /// server did not supply one.
    pub fn request(status: Option<u16>, message: Option<String>) -> Self {
        let message = match message.map(|m| m.trim().to_string()) {
            Some(m) if !m.is_empty() => m,
            _ => match status {
                Some(code) => format!("Request failed (HTTP {})", code),
                None => GENERIC_REQUEST_FAILURE.to_string(),
            },
        };
        ClientError::Request { status, message }
    }

    /// The message placed into the orchestrator's error field.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Errors from the durable key/value storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read storage file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write storage file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage file at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Errors from the export subsystem.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write export file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Image rendering failed: {0}")]
    Image(String),
}
