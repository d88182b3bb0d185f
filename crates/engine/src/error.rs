//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`MissingField`] returned when a calculation input lacks a field the
//!   selected calculator requires.
//! - [`UnsupportedKind`] returned for an unrecognized calculator kind string.
//! - [`KeyNotFound`] returned when a referenced item is not found.
//! - [`Storage`] wraps a failure reported by the storage collaborator.
//!
//! [`MissingField`]: EngineError::MissingField
//! [`UnsupportedKind`]: EngineError::UnsupportedKind
//! [`KeyNotFound`]: EngineError::KeyNotFound
//! [`Storage`]: EngineError::Storage
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("unsupported calculator kind: \"{0}\"")]
    UnsupportedKind(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}
