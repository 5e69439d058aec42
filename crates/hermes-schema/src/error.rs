//! Error types for schemas, forms, models and data sources.

use std::fmt;

use hermes_core::ApiError;
use thiserror::Error;

/// Result type for data source operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure while serializing an object through a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// A required field is absent from the source object.
    #[error("`{field}` is required by {schema} but missing on the serialized object")]
    MissingField {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
    },

    /// A value cannot be rendered as the field's kind.
    #[error("`{field}` has incorrect value of type {found}, expected {expected}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Expected kind.
        expected: String,
        /// Actual value type.
        found: String,
    },

    /// `many` serialization was requested for a non-sequence.
    #[error("{schema} expects a list of objects, got {found}")]
    NotASequence {
        /// Schema name.
        schema: String,
        /// Actual value type.
        found: String,
    },
}

/// A definition-time failure listing every violation.
///
/// Shared shape of [`SerializerDefinitionError`] and [`FormDefinitionError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionErrors {
    owner: String,
    errors: Vec<String>,
}

impl DefinitionErrors {
    pub(crate) fn new(owner: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            owner: owner.into(),
            errors,
        }
    }

    /// Name of the serializer or form being defined.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Every violation.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl fmt::Display for DefinitionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is incorrect ", self.owner)?;
        for error in &self.errors {
            write!(f, "\n* {error}")?;
        }
        Ok(())
    }
}

/// A model serializer could not be derived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Serializer {0}")]
pub struct SerializerDefinitionError(pub DefinitionErrors);

impl SerializerDefinitionError {
    /// Every violation.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        self.0.errors()
    }
}

/// A model form could not be derived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Form {0}")]
pub struct FormDefinitionError(pub DefinitionErrors);

impl FormDefinitionError {
    /// Every violation.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        self.0.errors()
    }
}

/// A form field or kind name has no entry in a mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A form field kind has no schema counterpart.
    #[error("`{field}` of {form} has unknown type {kind}, you should add rule to FORM_FIELD_MAPPING in settings")]
    UnknownFormField {
        /// Form name.
        form: String,
        /// Field name.
        field: String,
        /// Form field kind name.
        kind: String,
    },

    /// A mapping extension names a schema kind that does not exist.
    #[error("unknown schema field kind `{kind}` for `{source_kind}`")]
    UnknownSchemaKind {
        /// The mapped-from kind name.
        source_kind: String,
        /// The unknown schema kind name.
        kind: String,
    },
}

/// Data source failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No row with the given primary key.
    #[error("{model} with pk {pk} does not exist")]
    NotFound {
        /// Model name.
        model: String,
        /// Primary key rendered as text.
        pk: String,
    },

    /// A value was given for a column the model does not have.
    #[error("{model} has no field `{field}`")]
    UnknownField {
        /// Model name.
        model: String,
        /// Field name.
        field: String,
    },

    /// A non-nullable column received no value.
    #[error("{model}.{field} may not be null")]
    MissingValue {
        /// Model name.
        model: String,
        /// Field name.
        field: String,
    },

    /// Backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::fault(err)
    }
}

impl From<SerializeError> for ApiError {
    fn from(err: SerializeError) -> Self {
        Self::fault(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_errors_display() {
        let err = SerializerDefinitionError(DefinitionErrors::new(
            "ThingSerializer",
            vec!["`a` does not exist into model".into(), "`b` does not exist into model".into()],
        ));
        assert_eq!(
            err.to_string(),
            "Serializer ThingSerializer is incorrect \n* `a` does not exist into model\n* `b` does not exist into model"
        );
        assert_eq!(err.errors().len(), 2);
    }

    #[test]
    fn test_store_error_messages() {
        let err = StoreError::NotFound {
            model: "Thing".into(),
            pk: "3".into(),
        };
        assert_eq!(err.to_string(), "Thing with pk 3 does not exist");
    }

    #[test]
    fn test_store_and_serialize_errors_are_faults() {
        let store: ApiError = StoreError::Backend("disk full".into()).into();
        assert!(store.is_fault());

        let serialize: ApiError = SerializeError::MissingField {
            schema: "S".into(),
            field: "id".into(),
        }
        .into();
        assert!(serialize.is_fault());
    }
}
