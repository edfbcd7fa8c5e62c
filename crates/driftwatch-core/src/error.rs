//! Error taxonomy of the diff engine
//!
//! Both variants are fatal to the invocation: the engine emits no partial
//! result. An empty change list is not an error - callers distinguish
//! "no drift" through [`crate::DriftReport::has_changes`].

use thiserror::Error;

/// Errors the schema comparison can raise
#[derive(Debug, Error)]
pub enum DriftError {
    /// A schema description is malformed (blank names, duplicate join keys)
    #[error("invalid schema description: {0}")]
    InvalidSchema(String),

    /// A type name falls outside the closed vocabulary
    #[error("configuration error: {0}")]
    Configuration(String),
}
