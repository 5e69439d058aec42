//! # Hermes Telemetry
//!
//! Structured logging for Hermes applications, built on `tracing` and
//! `tracing-subscriber`.
//!
//! | Output | Config | Use |
//! |--------|--------|-----|
//! | JSON lines | [`LogConfig::production`] | log shipping |
//! | pretty | [`LogConfig::development`] | local work |
//!
//! The dispatcher logs three events per request through
//! [`log_request_start!`], [`log_request_complete!`] and
//! [`log_request_error!`], using the names in [`fields`].
//!
//! # Example
//!
//! ```
//! use hermes_telemetry::{init_logging, LogConfig};
//!
//! # fn main() -> Result<(), hermes_telemetry::TelemetryError> {
//! let config = LogConfig::with_level("warn", true).service_name("notes");
//! match init_logging(&config) {
//!     Err(e) if e.is_already_initialized() => {}
//!     other => other?,
//! }
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod logging;

pub use config::{LogConfig, DEFAULT_SERVICE_NAME};
pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging};

#[doc(hidden)]
pub use tracing as __tracing;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
