//! Error taxonomy for Hermes.
//!
//! Two families of errors live here:
//!
//! - [`HttpError`]: a domain error kind that aborts the request pipeline and
//!   is rendered to the caller as an error envelope.
//! - [`ApiError`]: what business logic returns. It is either an [`HttpError`]
//!   or an internal fault carried as [`anyhow::Error`].
//!
//! Every [`HttpError`] renders as
//!
//! ```json
//! {"status": "<alias>", "message": "<description>", "data": {}, "field_problems": {...}}
//! ```
//!
//! where `field_problems` is present only for form validation failures.

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::fmt;
use thiserror::Error;

/// Result type for endpoint business logic.
pub type ApiResult<T> = Result<T, ApiError>;

/// The fixed set of HTTP error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpErrorKind {
    /// The endpoint does not accept the request method.
    NotImplemented,
    /// Malformed request.
    BadRequest,
    /// Input form validation failed; carries per-field problems.
    FormError,
    /// Caller must authenticate first.
    AuthRequired,
    /// Caller is not allowed to perform the action.
    Forbidden,
    /// Requested object does not exist.
    NotFound,
    /// Reserved for rate limiting.
    TooManyRequests,
    /// Unexpected server-side failure.
    InternalError,
}

impl HttpErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::NotImplemented,
        Self::BadRequest,
        Self::FormError,
        Self::AuthRequired,
        Self::Forbidden,
        Self::NotFound,
        Self::TooManyRequests,
        Self::InternalError,
    ];

    /// HTTP status code for this kind.
    #[must_use]
    pub const fn http_code(self) -> u16 {
        match self {
            Self::NotImplemented => 405,
            Self::BadRequest | Self::FormError => 400,
            Self::AuthRequired => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::TooManyRequests => 429,
            Self::InternalError => 500,
        }
    }

    /// HTTP status code as a [`StatusCode`].
    #[must_use]
    pub fn status_code(self) -> StatusCode {
        StatusCode::from_u16(self.http_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Machine-readable alias rendered as the envelope `status`.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::NotImplemented => "not_implemented",
            Self::BadRequest | Self::FormError => "bad_request",
            Self::AuthRequired => "auth_required",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::TooManyRequests => "too_many_requests",
            Self::InternalError => "internal_error",
        }
    }

    /// Default human-readable description rendered as the envelope `message`.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotImplemented => "Not implemented",
            Self::BadRequest | Self::FormError => "Bad request",
            Self::AuthRequired => "Authentication required",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::TooManyRequests => "Too many requests",
            Self::InternalError => "Internal server error",
        }
    }

    /// Name of the reusable documentation schema describing this kind.
    #[must_use]
    pub const fn schema_name(self) -> &'static str {
        match self {
            Self::NotImplemented => "NotImplemented",
            Self::BadRequest => "BadRequest",
            Self::FormError => "FormError",
            Self::AuthRequired => "AuthenticationRequired",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "NotFound",
            Self::TooManyRequests => "TooManyRequests",
            Self::InternalError => "InternalServerError",
        }
    }

    /// Whether errors of this kind carry `field_problems`.
    #[must_use]
    pub const fn has_field_problems(self) -> bool {
        matches!(self, Self::FormError)
    }
}

/// Per-field validation problems, in field declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("Field validation errors")]
#[serde(transparent)]
pub struct FieldErrors {
    fields: IndexMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Records several problems for a field at once.
    pub fn extend_field(&mut self, field: impl Into<String>, messages: Vec<String>) {
        self.fields.entry(field.into()).or_default().extend(messages);
    }

    /// Problems recorded for one field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Iterates fields with their problems.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns true if no problems were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with problems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// JSON object `{field: [messages]}`.
    #[must_use]
    pub fn to_json(&self) -> Json {
        serde_json::to_value(&self.fields).unwrap_or_else(|_| json!({}))
    }
}

/// A domain error that aborts the pipeline with an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    kind: HttpErrorKind,
    message: Option<String>,
    field_problems: Option<FieldErrors>,
}

impl HttpError {
    /// Creates an error of the given kind with its default description.
    #[must_use]
    pub const fn new(kind: HttpErrorKind) -> Self {
        Self {
            kind,
            message: None,
            field_problems: None,
        }
    }

    /// 405 `not_implemented`.
    #[must_use]
    pub const fn not_implemented() -> Self {
        Self::new(HttpErrorKind::NotImplemented)
    }

    /// 400 `bad_request` with the default description.
    #[must_use]
    pub const fn bad_request() -> Self {
        Self::new(HttpErrorKind::BadRequest)
    }

    /// 400 `bad_request` with a custom description.
    #[must_use]
    pub fn bad_request_with(message: impl Into<String>) -> Self {
        Self::bad_request().with_message(message)
    }

    /// 400 `bad_request` carrying per-field problems.
    #[must_use]
    pub fn form(field_problems: FieldErrors) -> Self {
        Self {
            kind: HttpErrorKind::FormError,
            message: None,
            field_problems: Some(field_problems),
        }
    }

    /// 401 `auth_required`.
    #[must_use]
    pub const fn auth_required() -> Self {
        Self::new(HttpErrorKind::AuthRequired)
    }

    /// 403 `forbidden`.
    #[must_use]
    pub const fn forbidden() -> Self {
        Self::new(HttpErrorKind::Forbidden)
    }

    /// 404 `not_found`.
    #[must_use]
    pub const fn not_found() -> Self {
        Self::new(HttpErrorKind::NotFound)
    }

    /// 429 `too_many_requests`.
    #[must_use]
    pub const fn too_many_requests() -> Self {
        Self::new(HttpErrorKind::TooManyRequests)
    }

    /// 500 `internal_error`.
    #[must_use]
    pub const fn internal() -> Self {
        Self::new(HttpErrorKind::InternalError)
    }

    /// Overrides the description.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The error kind.
    #[must_use]
    pub const fn kind(&self) -> HttpErrorKind {
        self.kind
    }

    /// Numeric HTTP status code.
    #[must_use]
    pub const fn http_code(&self) -> u16 {
        self.kind.http_code()
    }

    /// HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    /// Envelope `status` value.
    #[must_use]
    pub const fn alias(&self) -> &'static str {
        self.kind.alias()
    }

    /// Envelope `message` value.
    #[must_use]
    pub fn description(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.description())
    }

    /// Per-field problems, if this is a form error.
    #[must_use]
    pub fn field_problems(&self) -> Option<&FieldErrors> {
        self.field_problems.as_ref()
    }

    /// Builds the error envelope.
    #[must_use]
    pub fn get_dict(&self) -> Json {
        let mut body = json!({
            "status": self.alias(),
            "message": self.description(),
            "data": {},
        });
        if let (Some(problems), Some(map)) = (&self.field_problems, body.as_object_mut()) {
            map.insert("field_problems".to_string(), problems.to_json());
        }
        body
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.http_code(), self.alias(), self.description())
    }
}

impl std::error::Error for HttpError {}

impl From<HttpErrorKind> for HttpError {
    fn from(kind: HttpErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<FieldErrors> for HttpError {
    fn from(problems: FieldErrors) -> Self {
        Self::form(problems)
    }
}

/// Error returned by endpoint business logic.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A domain error rendered to the caller.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// An internal fault. Rendered as 500 unless debug mode is on.
    #[error("internal fault: {0:#}")]
    Fault(#[from] anyhow::Error),
}

impl ApiError {
    /// Wraps any error as an internal fault.
    pub fn fault(error: impl Into<anyhow::Error>) -> Self {
        Self::Fault(error.into())
    }

    /// Returns the domain error, if this is one.
    #[must_use]
    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(e) => Some(e),
            Self::Fault(_) => None,
        }
    }

    /// Returns true if this is an internal fault.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

impl From<HttpErrorKind> for ApiError {
    fn from(kind: HttpErrorKind) -> Self {
        Self::Http(HttpError::new(kind))
    }
}

impl From<FieldErrors> for ApiError {
    fn from(problems: FieldErrors) -> Self {
        Self::Http(HttpError::form(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_constants() {
        assert_eq!(HttpErrorKind::NotImplemented.http_code(), 405);
        assert_eq!(HttpErrorKind::NotFound.alias(), "not_found");
        assert_eq!(HttpErrorKind::NotFound.description(), "Not Found");
        assert_eq!(HttpErrorKind::TooManyRequests.http_code(), 429);
        assert_eq!(
            HttpErrorKind::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_form_error_shares_bad_request_wire_shape() {
        assert_eq!(HttpErrorKind::FormError.alias(), HttpErrorKind::BadRequest.alias());
        assert_eq!(HttpErrorKind::FormError.http_code(), 400);
        assert!(HttpErrorKind::FormError.has_field_problems());
        assert!(!HttpErrorKind::BadRequest.has_field_problems());
    }

    #[test]
    fn test_get_dict_without_problems() {
        let body = HttpError::not_found().get_dict();
        assert_eq!(
            body,
            json!({"status": "not_found", "message": "Not Found", "data": {}})
        );
    }

    #[test]
    fn test_get_dict_with_problems() {
        let mut problems = FieldErrors::new();
        problems.add("f", "This field is required.");
        problems.add("i", "This field is required.");

        let body = HttpError::form(problems).get_dict();
        assert_eq!(body["status"], "bad_request");
        assert_eq!(body["message"], "Bad request");
        assert_eq!(body["data"], json!({}));
        assert_eq!(body["field_problems"]["f"][0], "This field is required.");
        assert_eq!(body["field_problems"]["i"][0], "This field is required.");
    }

    #[test]
    fn test_custom_message() {
        let err = HttpError::bad_request_with("body json is invalid");
        assert_eq!(err.description(), "body json is invalid");
        assert_eq!(err.get_dict()["message"], "body json is invalid");
        assert_eq!(err.to_string(), "400 bad_request: body json is invalid");
    }

    #[test]
    fn test_field_errors_keep_order() {
        let mut problems = FieldErrors::new();
        problems.add("zeta", "a");
        problems.add("alpha", "b");
        problems.add("zeta", "c");

        let names: Vec<&str> = problems.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(problems.get("zeta"), Some(&["a".to_string(), "c".to_string()][..]));
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_api_error_conversions() {
        let err: ApiError = HttpErrorKind::Forbidden.into();
        assert_eq!(err.as_http().map(HttpError::http_code), Some(403));

        let fault: ApiError = anyhow::anyhow!("boom").into();
        assert!(fault.is_fault());
        assert!(fault.as_http().is_none());
    }
}
