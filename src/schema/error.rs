//! Error types for descriptor loading and locale configuration.
//!
//! Validation failures are data ([`super::ValidateError`]); the errors here
//! describe a broken schema document or locale file.

use super::diagnostic::SchemaDiagnostic;

/// Errors that can occur when loading schema descriptors, input values, or
/// locale tables.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// YAML deserialization failed (malformed YAML or descriptor mismatch).
    #[error("YAML deserialization failed: {message}")]
    Deserialize {
        /// Human-readable parser error.
        message: String,
        /// Structured diagnostic, when the parser reported a location.
        diagnostic: Option<SchemaDiagnostic>,
    },

    /// A descriptor was well-formed YAML but does not describe a schema.
    #[error("invalid descriptor for schema '{schema}': {reason}")]
    InvalidDescriptor {
        /// The name of the schema document that failed.
        schema: String,
        /// A human-readable explanation of the problem.
        reason: String,
        /// Structured diagnostic pointing at the offending node.
        diagnostic: Option<SchemaDiagnostic>,
    },

    /// A descriptor file could not be read.
    #[error("failed to read '{path}': {reason}")]
    Io {
        /// The path being read.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// A locale table could not be read or parsed.
    #[error("failed to load locale '{locale}': {reason}")]
    Locale {
        /// Locale code (or file name) being loaded.
        locale: String,
        /// A human-readable explanation of the failure.
        reason: String,
    },
}

impl SchemaError {
    /// Returns the structured diagnostic payload, when available.
    #[must_use]
    pub const fn diagnostic(&self) -> Option<&SchemaDiagnostic> {
        match self {
            Self::Deserialize { diagnostic, .. } | Self::InvalidDescriptor { diagnostic, .. } => {
                diagnostic.as_ref()
            }
            Self::Io { .. } | Self::Locale { .. } => None,
        }
    }
}
