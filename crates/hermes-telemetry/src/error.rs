//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("Invalid log filter `{directive}`: {reason}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber is already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

impl TelemetryError {
    /// Whether this error only reports an earlier initialization.
    #[must_use]
    pub const fn is_already_initialized(&self) -> bool {
        matches!(self, Self::AlreadyInitialized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::InvalidFilter {
            directive: "hermes=loud".to_string(),
            reason: "invalid level".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid log filter `hermes=loud`: invalid level");
    }

    #[test]
    fn test_already_initialized() {
        let err = TelemetryError::AlreadyInitialized("global default already set".to_string());
        assert!(err.is_already_initialized());
        assert!(!TelemetryError::InvalidFilter {
            directive: String::new(),
            reason: String::new()
        }
        .is_already_initialized());
    }
}
