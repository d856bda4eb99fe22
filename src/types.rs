/*!
Core types and error handling for UAI → RailLabel translation.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use thiserror::Error;

/// Result type for translation operations
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Error types for translation operations
///
/// Every error carries the breadcrumb path of the offending value inside the
/// source document, e.g. `frames[3].annotations.2D_POLYGON[0].geometry.points[2]`.
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("type mismatch at {path}: expected {expected}, got {got}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        got: String,
    },

    #[error("invalid UUID at {path}: '{text}'")]
    InvalidUuid { path: String, text: String },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("unsupported attribute type at {path}: {kind} value {value}")]
    UnsupportedAttributeType {
        path: String,
        kind: &'static str,
        value: String,
    },

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

// Convert from serde_json::Error
impl From<serde_json::Error> for TranslateError {
    fn from(err: serde_json::Error) -> Self {
        TranslateError::JsonError(err.to_string())
    }
}

// Convert from std::io::Error
impl From<std::io::Error> for TranslateError {
    fn from(err: std::io::Error) -> Self {
        TranslateError::IoError(err.to_string())
    }
}
