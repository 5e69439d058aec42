//! Settings errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for settings operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A settings source could not be loaded, or the merged settings are invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file does not exist.
    #[error("settings file {} does not exist", path.display())]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The settings file exists but could not be read.
    #[error("cannot read settings file {}", path.display())]
    ReadError {
        /// Requested path.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: io::Error,
    },

    /// Malformed TOML, or a key no section declares.
    #[error("bad TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or a key no section declares.
    #[error("bad JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither `toml` nor `json`.
    #[error("unsupported settings format `{0}`")]
    UnsupportedFormat(String),

    /// A value parsed but is not acceptable.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the setting.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An environment variable or `.env` file could not be used.
    #[error("environment {var}: {reason}")]
    EnvParseError {
        /// Variable name or `.env` path.
        var: String,
        /// Parser message.
        reason: String,
    },
}

impl ConfigError {
    /// `FileNotFound` for `path`.
    #[must_use]
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// `ReadError` for `path`.
    #[must_use]
    pub fn read_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// `InvalidValue` for a dotted setting path.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// `EnvParseError` for a variable.
    #[must_use]
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
