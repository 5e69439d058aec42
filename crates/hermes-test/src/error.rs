//! Test error types.

use thiserror::Error;

/// Errors raised while building a test request or reading its response.
#[derive(Debug, Error)]
pub enum TestError {
    /// The request could not be assembled.
    #[error("Request build error: {0}")]
    RequestBuild(String),

    /// A header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The response body could not be read.
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            TestError::InvalidHeader("bad\nvalue".to_string()).to_string(),
            "Invalid header: bad\nvalue"
        );
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(TestError::from(json).to_string().starts_with("JSON error:"));
    }
}
