//! # Error Types
//!
//! Structured error types for coldstore_core. Errors serialize cleanly so the
//! design orchestrator can place them inside a [`DesignResult`](crate::design::DesignResult)
//! instead of failing the whole run.
//!
//! ## Example
//!
//! ```rust
//! use coldstore_core::errors::{CalcError, CalcResult};
//!
//! fn validate_height(height_m: f64) -> CalcResult<()> {
//!     if height_m <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "height_m",
//!             height_m.to_string(),
//!             "Height must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_height(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for coldstore_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for design operations.
///
/// `InvalidInput` and `NoCandidate` are the two failure kinds of the
/// calculation core; the remaining variants belong to catalog lookup and
/// file handling around it.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A parameter is outside its physically valid range or inconsistent
    /// with another parameter.
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// No catalog entry or combination covers the required load.
    #[error(
        "No candidate for {stage} stage: required {required_kw:.2} kW, \
         best available {max_available_kw:.2} kW"
    )]
    NoCandidate {
        stage: String,
        required_kw: f64,
        max_available_kw: f64,
    },

    /// A catalog key (product, insulation, climate zone) does not exist
    #[error("Unknown {catalog} entry: {key}")]
    UnknownCatalogEntry { catalog: String, key: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a NoCandidate error for the named stage
    pub fn no_candidate(stage: impl Into<String>, required_kw: f64, max_available_kw: f64) -> Self {
        CalcError::NoCandidate {
            stage: stage.into(),
            required_kw,
            max_available_kw,
        }
    }

    /// Create an UnknownCatalogEntry error
    pub fn unknown_entry(catalog: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::UnknownCatalogEntry {
            catalog: catalog.into(),
            key: key.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::NoCandidate { .. } => "NO_CANDIDATE",
            CalcError::UnknownCatalogEntry { .. } => "UNKNOWN_CATALOG_ENTRY",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: e.to_string(),
        }
    }
}

/// Collapse a list of validation problems into the first one.
///
/// Components report every problem they find; single-shot callers such as
/// [`compute_load`](crate::loads::compute_load) only need the first.
pub(crate) fn first_error(errors: Vec<CalcError>) -> CalcResult<()> {
    match errors.into_iter().next() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
