//! The inbound request model.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method};

use hermes_core::CallerIdentity;

use crate::{ExtractionError, QueryParams};

/// An HTTP-like request as seen by the pipeline.
///
/// Transport adapters build one from an [`http::Request`]; tests usually
/// build one directly.
///
/// # Example
///
/// ```rust
/// use hermes_extract::ApiRequest;
/// use http::Method;
///
/// let request = ApiRequest::new(Method::POST, "/thing/create")
///     .query_param("dry_run", "1")
///     .json(&serde_json::json!({"i": 1}));
///
/// assert_eq!(request.path(), "/thing/create");
/// assert_eq!(request.query().get("dry_run"), Some("1"));
/// assert_eq!(request.content_type(), Some("application/json"));
/// assert!(!request.caller().is_authenticated());
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: QueryParams,
    headers: HeaderMap,
    body: Bytes,
    identity: CallerIdentity,
}

impl ApiRequest {
    /// A request without query, headers or body, from an anonymous caller.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            identity: CallerIdentity::Anonymous,
        }
    }

    /// Converts an `http` request. The query string is decoded eagerly.
    pub fn from_http(request: http::Request<Bytes>) -> Result<Self, ExtractionError> {
        let (parts, body) = request.into_parts();
        let query = QueryParams::parse(parts.uri.query().unwrap_or(""))?;
        let identity = parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .unwrap_or_default();
        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query,
            headers: parts.headers,
            body,
            identity,
        })
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Appends one query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(key, value);
        self
    }

    /// Adds a header. Invalid header values are ignored.
    #[must_use]
    pub fn header(mut self, name: header::HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets a raw body with its content type.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>, content_type: &str) -> Self {
        self.body = body.into();
        self.header(header::CONTENT_TYPE, content_type)
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json(self, value: &serde_json::Value) -> Self {
        self.body(value.to_string(), "application/json")
    }

    /// Sets the caller identity.
    #[must_use]
    pub fn identity(mut self, identity: CallerIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters.
    #[must_use]
    pub const fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value as a string.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_value("content-type")
    }

    /// Body bytes.
    #[must_use]
    pub const fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Who is calling.
    #[must_use]
    pub const fn caller(&self) -> &CallerIdentity {
        &self.identity
    }
}
