//! Error types for documentation generation.

use hermes_schema::MappingError;
use thiserror::Error;

/// Errors that can occur while generating a document.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A declared form cannot be projected onto a schema.
    #[error("Failed to document form: {0}")]
    FormMapping(#[from] MappingError),

    /// Two endpoints claim the same path and method.
    #[error("Duplicate operation {method} {path}")]
    DuplicateOperation {
        /// Path of the operation.
        path: String,
        /// Upper-case method.
        method: String,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid").unwrap_err().into();
        assert!(matches!(err, DocsError::SerializationError(_)));
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_duplicate_operation_error() {
        let err = DocsError::DuplicateOperation {
            path: "/notes".into(),
            method: "GET".into(),
        };
        assert_eq!(err.to_string(), "Duplicate operation GET /notes");
    }
}
