//! Subscriber installation and request log events.
//!
//! [`init_logging`] installs a global `tracing` subscriber built from a
//! [`LogConfig`]: an `EnvFilter` over a single fmt layer that writes either
//! JSON lines or pretty multi-line records.
//!
//! The request macros emit the three events the dispatcher logs for every
//! request, with the field names listed in [`fields`].

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::LogConfig;
use crate::error::TelemetryError;
use crate::TelemetryResult;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber.
///
/// Does nothing when the config is disabled.
///
/// # Errors
///
/// - `TelemetryError::InvalidFilter` if `config.level` is not a valid filter
/// - `TelemetryError::AlreadyInitialized` if a global subscriber exists
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = tracing_subscriber::fmt::layer()
        .with_span_events(span_events)
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_thread_ids(config.thread_ids)
        .with_target(config.include_target);

    let layer: BoxedLayer = if config.json_format {
        base.json().boxed()
    } else {
        base.pretty().boxed()
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service.name = %config.service_name,
        level = %config.level,
        json = config.json_format,
        "Logging initialized"
    );
    Ok(())
}

/// Parses a filter directive such as `info` or `hermes_pipeline=debug,warn`.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` if the directive does not parse.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

/// Field names used by Hermes log events.
pub mod fields {
    /// Request id.
    pub const REQUEST_ID: &str = "request_id";

    /// HTTP method.
    pub const HTTP_METHOD: &str = "http.method";

    /// Request path.
    pub const HTTP_PATH: &str = "http.path";

    /// Response status code.
    pub const HTTP_STATUS: &str = "http.status_code";

    /// Handling time in milliseconds.
    pub const DURATION_MS: &str = "duration_ms";

    /// Error message.
    pub const ERROR: &str = "error";

    /// Authenticated identity.
    pub const USER: &str = "user";

    /// Endpoint class name.
    pub const ENDPOINT: &str = "endpoint";

    /// Service name.
    pub const SERVICE_NAME: &str = "service.name";
}

/// Logs the start of a request.
#[macro_export]
macro_rules! log_request_start {
    ($request_id:expr, $method:expr, $path:expr) => {
        $crate::__tracing::info!(
            request_id = %$request_id,
            http.method = %$method,
            http.path = %$path,
            "Request started"
        );
    };
}

/// Logs a completed request with its status and duration.
#[macro_export]
macro_rules! log_request_complete {
    ($request_id:expr, $path:expr, $status:expr, $duration_ms:expr) => {
        $crate::__tracing::info!(
            request_id = %$request_id,
            http.path = %$path,
            http.status_code = $status,
            duration_ms = $duration_ms,
            "Request completed"
        );
    };
}

/// Logs a request that ended in an internal fault.
#[macro_export]
macro_rules! log_request_error {
    ($request_id:expr, $path:expr, $error:expr) => {
        $crate::__tracing::error!(
            request_id = %$request_id,
            http.path = %$path,
            error = %$error,
            "Request failed"
        );
    };
}
