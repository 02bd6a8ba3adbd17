//! Hard failures reported to callers.
//!
//! Validation findings are never errors; they live in the [`crate::Ledger`].

use thiserror::Error;

use crate::ledger::FieldError;
use crate::models::FieldId;

/// Translation key for a rejected import.
pub const INVALID_CONFIGURATION_KEY: &str = "import.invalidConfigurationData";

/// Bulk import rejected as a whole; nothing was applied.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid configuration data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid configuration data: expected a JSON object")]
    NotAnObject,
    #[error("invalid configuration data: unknown drone type {0:?}")]
    UnknownDroneType(String),
}

impl ReconcileError {
    pub fn key(&self) -> &'static str {
        INVALID_CONFIGURATION_KEY
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form has {} validation error(s)", .0.len())]
    Invalid(Vec<FieldError>),
    /// Nothing changed since the last successful submission.
    #[error("configuration unchanged since last submission")]
    Unchanged,
    #[error("missing required value for {0}")]
    MissingValue(FieldId),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("form has {} validation error(s)", .0.len())]
    Invalid(Vec<FieldError>),
    #[error("failed to encode configuration: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("a saved configuration needs a name")]
    MissingName,
    #[error("missing required value for {0}")]
    MissingValue(FieldId),
}
