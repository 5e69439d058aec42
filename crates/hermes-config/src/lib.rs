//! Typed settings for Hermes applications.
//!
//! This crate provides the [`Settings`] consumed by the `hermes` facade:
//! - TOML and JSON settings files
//! - `.env` files and environment variable overrides
//! - Strict parsing (fails on unknown fields)
//! - Validation of codec names, log level and field kind tables
//!
//! # Overview
//!
//! - [`PipelineSettings`] - default body parser and renderer
//! - [`DocsSettings`] - header of the generated OpenAPI document
//! - [`LoggingSettings`] - log level and output format
//! - [`MappingSettings`] - extensions of the field kind tables
//!
//! # Example
//!
//! ```
//! use hermes_config::SettingsLoader;
//!
//! # fn main() -> Result<(), hermes_config::ConfigError> {
//! let settings = SettingsLoader::new()
//!     .with_string("debug = true\n[logging]\nlevel = \"debug\"", "toml")?
//!     .load()?;
//!
//! assert!(settings.debug);
//! # Ok(())
//! # }
//! ```
//!
//! # Settings File Format
//!
//! ```toml
//! debug = false
//!
//! [pipeline]
//! parser = "json"
//! renderer = "json"
//!
//! [docs]
//! project_name = "notes"
//! project_version = "1.0.0"
//! openapi_version = "3.0.2"
//!
//! [logging]
//! level = "info"
//! json_format = true
//!
//! [mappings.serializer_field_mapping]
//! JSONField = "Dict"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `HERMES__SECTION__KEY` variables:
//!
//! - `HERMES__DEBUG=true`
//! - `HERMES__PIPELINE__PARSER=json`
//! - `HERMES__DOCS__PROJECT_NAME=notes`
//! - `HERMES__LOGGING__LEVEL=debug`

#![doc(html_root_url = "https://docs.rs/hermes-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::Settings;
pub use error::{ConfigError, ConfigResult};
pub use loader::{SettingsLoader, ENV_PREFIX};
pub use schema::{DocsSettings, LoggingSettings, MappingSettings, PipelineSettings, LOG_LEVELS};
