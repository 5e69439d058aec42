//! Application assembly errors.

use thiserror::Error;

use hermes_config::ConfigError;
use hermes_core::{IncorrectMeta, RegistryError};
use hermes_docs::DocsError;
use hermes_pipeline::PipelineError;
use hermes_schema::{FormDefinitionError, SerializerDefinitionError};
use hermes_telemetry::TelemetryError;

/// Result type for application assembly.
pub type AppResult<T> = Result<T, AppError>;

/// Error raised while an application is assembled or documented.
///
/// None of these reach a caller at request time: they surface from
/// [`AppBuilder`](crate::AppBuilder) and from document generation.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Two endpoints share a path.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Parser or renderer lookup failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The log subscriber could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The API document could not be generated.
    #[error(transparent)]
    Docs(#[from] DocsError),

    /// Endpoint metadata is incorrect.
    #[error(transparent)]
    Meta(#[from] IncorrectMeta),

    /// A model serializer could not be derived.
    #[error(transparent)]
    Serializer(#[from] SerializerDefinitionError),

    /// A model form could not be derived.
    #[error(transparent)]
    Form(#[from] FormDefinitionError),
}
