//! Extraction error types.
//!
//! Extraction failures are client errors. They carry the part of the request
//! they came from and convert into the [`HttpError`] a pipeline renders.

use std::fmt;

use hermes_core::{ApiError, HttpError};

/// Part of the request that failed to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Query string.
    Query,
    /// Request body.
    Body,
    /// HTTP headers.
    Header,
    /// `Content-Type` header specifically.
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Body => write!(f, "body"),
            Self::Header => write!(f, "header"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Input is not in the expected wire format.
    Malformed,
    /// Parsed input has the wrong shape.
    InvalidShape,
    /// No parser accepts the content type.
    UnsupportedMediaType,
}

/// Error that occurs while reading a request.
///
/// # Example
///
/// ```rust
/// use hermes_core::HttpError;
/// use hermes_extract::{ExtractionError, ExtractionSource};
///
/// let err = ExtractionError::malformed(ExtractionSource::Body, "expected value at line 1");
/// assert_eq!(err.extraction_source(), ExtractionSource::Body);
///
/// let http: HttpError = err.into();
/// assert_eq!(http.http_code(), 400);
/// assert_eq!(http.description(), "body json is invalid");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    message: String,
}

impl ExtractionError {
    /// Input could not be decoded.
    #[must_use]
    pub fn malformed(source: ExtractionSource, details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Malformed,
            message: format!("failed to decode {source}: {details}"),
        }
    }

    /// Input decoded but is not the expected shape.
    #[must_use]
    pub fn invalid_shape(source: ExtractionSource, expected: &str) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::InvalidShape,
            message: format!("{source} should be {expected}"),
        }
    }

    /// No parser handles the request's content type.
    #[must_use]
    pub fn unsupported_media_type(expected: &str, actual: Option<&str>) -> Self {
        let actual = actual.unwrap_or("none");
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: format!("unsupported content type: expected '{expected}', got '{actual}'"),
        }
    }

    /// Part of the request that failed.
    #[must_use]
    pub const fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Diagnostic message (not rendered to callers).
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The error rendered to the caller.
    #[must_use]
    pub fn to_http_error(&self) -> HttpError {
        match (self.extraction_source, self.kind) {
            (ExtractionSource::Body, _) => HttpError::bad_request_with("body json is invalid"),
            (ExtractionSource::Query, _) => HttpError::bad_request_with("query string is invalid"),
            (_, ExtractionErrorKind::UnsupportedMediaType) => {
                HttpError::bad_request_with("unsupported content type")
            }
            _ => HttpError::bad_request(),
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

impl From<ExtractionError> for HttpError {
    fn from(err: ExtractionError) -> Self {
        err.to_http_error()
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        Self::Http(err.to_http_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::HttpErrorKind;

    #[test]
    fn test_malformed_body() {
        let err = ExtractionError::malformed(ExtractionSource::Body, "EOF while parsing");

        assert_eq!(err.extraction_source(), ExtractionSource::Body);
        assert!(err.to_string().contains("EOF while parsing"));

        let http = err.to_http_error();
        assert_eq!(http.kind(), HttpErrorKind::BadRequest);
        assert_eq!(
            http.get_dict(),
            serde_json::json!({"status": "bad_request", "message": "body json is invalid", "data": {}})
        );
    }

    #[test]
    fn test_invalid_shape_is_bad_request() {
        let err = ExtractionError::invalid_shape(ExtractionSource::Body, "an object");
        assert_eq!(err.to_string(), "body should be an object");
        let api: ApiError = err.into();
        assert_eq!(api.as_http().map(HttpError::http_code), Some(400));
    }

    #[test]
    fn test_unsupported_media_type() {
        let err = ExtractionError::unsupported_media_type("application/json", Some("text/plain"));
        assert_eq!(err.extraction_source(), ExtractionSource::ContentType);
        assert!(err.to_string().contains("text/plain"));
        assert_eq!(err.to_http_error().description(), "unsupported content type");
    }

    #[test]
    fn test_extraction_source_display() {
        assert_eq!(ExtractionSource::Query.to_string(), "query");
        assert_eq!(ExtractionSource::Body.to_string(), "body");
        assert_eq!(ExtractionSource::Header.to_string(), "header");
        assert_eq!(ExtractionSource::ContentType.to_string(), "content-type");
    }
}
