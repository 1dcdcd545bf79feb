//! Error types for the fabric VPG validator.
//!
//! Only faults live here. Configuration conflicts found during a scan are
//! findings (see [`crate::failures`]) and never surface as errors.

use std::io;
use thiserror::Error;

/// Result type alias for validator operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Faults that abort a validation run.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Reading or writing a file failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON input or output could not be processed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    Configuration {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// A VPG record is missing a required field.
    #[error("Malformed VPG '{uuid}': {message}")]
    MalformedVpg {
        /// UUID of the offending record (may be empty).
        uuid: String,
        /// What is wrong with it.
        message: String,
    },

    /// The name resolver has no entry for an interface.
    #[error("Interface '{id}' could not be resolved to a display name")]
    UnknownInterface {
        /// The interface identifier.
        id: String,
    },

    /// The VPG data source failed.
    #[error("VPG source error: {0}")]
    Source(String),
}

impl AuditError {
    /// Creates a configuration error.
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed VPG error.
    pub fn malformed_vpg(uuid: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedVpg {
            uuid: uuid.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown interface error.
    pub fn unknown_interface(id: impl Into<String>) -> Self {
        Self::UnknownInterface { id: id.into() }
    }
}
