//! Per-request pipeline state.
//!
//! A [`PipelineContext`] lives for exactly one dispatch. It owns the
//! request, the validated query and body, and any typed extension data
//! endpoints attach along the way. Nothing in it is shared between
//! concurrent requests.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hermes_core::{CallerIdentity, HttpError, RequestId};
use hermes_extract::{ApiRequest, Parser};
use hermes_schema::{CleanedData, FormData};

/// State that flows through the pipeline stages.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use hermes_extract::{ApiRequest, JsonParser};
/// use hermes_pipeline::PipelineContext;
/// use http::Method;
///
/// let request = ApiRequest::new(Method::POST, "/notes/create")
///     .json(&serde_json::json!({"text": "hi"}));
/// let mut ctx = PipelineContext::new(request, Arc::new(JsonParser));
///
/// assert!(ctx.request_body().is_none());
/// assert_eq!(ctx.body_data().unwrap()["text"], "hi");
/// ```
#[derive(Debug)]
pub struct PipelineContext {
    request: ApiRequest,
    request_id: RequestId,
    parser: Arc<dyn Parser>,
    body: Option<FormData>,
    request_query: Option<CleanedData>,
    request_body: Option<CleanedData>,
    started_at: Instant,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PipelineContext {
    /// Creates a context with a fresh request id.
    #[must_use]
    pub fn new(request: ApiRequest, parser: Arc<dyn Parser>) -> Self {
        Self::with_request_id(request, parser, RequestId::new())
    }

    /// Creates a context with a specific request id.
    ///
    /// Useful when the transport already assigned one.
    #[must_use]
    pub fn with_request_id(request: ApiRequest, parser: Arc<dyn Parser>, request_id: RequestId) -> Self {
        Self {
            request,
            request_id,
            parser,
            body: None,
            request_query: None,
            request_body: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// The inbound request.
    #[must_use]
    pub const fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// Request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.request.path()
    }

    /// The calling identity.
    #[must_use]
    pub const fn identity(&self) -> &CallerIdentity {
        self.request.caller()
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Raw query parameters as form input.
    #[must_use]
    pub fn query_data(&self) -> FormData {
        self.request.query().to_form_data()
    }

    /// The parsed request body.
    ///
    /// Bodies whose content type the parser does not accept read as an empty
    /// object, as do empty bodies. The body is parsed at most once.
    pub fn body_data(&mut self) -> Result<FormData, HttpError> {
        if let Some(body) = &self.body {
            return Ok(body.clone());
        }
        let bytes = self.request.body_bytes();
        let body = if bytes.is_empty() || !self.parser.accepts(self.request.content_type()) {
            FormData::new()
        } else {
            self.parser.parse_object(bytes)?
        };
        self.body = Some(body.clone());
        Ok(body)
    }

    /// Validated query, once `QueryValidate` ran with a `query_form`.
    #[must_use]
    pub const fn request_query(&self) -> Option<&CleanedData> {
        self.request_query.as_ref()
    }

    /// Validated body, once `BodyValidate` ran with a `body_form`.
    #[must_use]
    pub const fn request_body(&self) -> Option<&CleanedData> {
        self.request_body.as_ref()
    }

    /// Stores the validated query.
    pub fn set_request_query(&mut self, data: CleanedData) {
        self.request_query = Some(data);
    }

    /// Stores the validated body.
    pub fn set_request_body(&mut self, data: CleanedData) {
        self.request_body = Some(data);
    }

    /// Returns when the request started processing.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value, replacing any previous one.
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use hermes_extract::{ApiRequest, JsonParser};
    /// use hermes_pipeline::PipelineContext;
    /// use http::Method;
    ///
    /// struct Tenant(&'static str);
    ///
    /// let mut ctx = PipelineContext::new(ApiRequest::new(Method::GET, "/"), Arc::new(JsonParser));
    /// ctx.set_extension(Tenant("acme"));
    /// assert_eq!(ctx.get_extension::<Tenant>().unwrap().0, "acme");
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::HttpErrorKind;
    use hermes_extract::JsonParser;
    use http::Method;
    use serde_json::json;

    fn ctx(request: ApiRequest) -> PipelineContext {
        PipelineContext::new(request, Arc::new(JsonParser))
    }

    #[test]
    fn test_new_context_is_anonymous_and_unvalidated() {
        let ctx = ctx(ApiRequest::new(Method::GET, "/things/list"));
        assert!(!ctx.identity().is_authenticated());
        assert!(ctx.request_query().is_none());
        assert!(ctx.request_body().is_none());
        assert_eq!(ctx.path(), "/things/list");
    }

    #[test]
    fn test_query_data() {
        let ctx = ctx(
            ApiRequest::new(Method::GET, "/things/get")
                .query_param("id", "3")
                .query_param("tag", "a")
                .query_param("tag", "b"),
        );
        let data = ctx.query_data();
        assert_eq!(data["id"], "3");
        assert_eq!(data["tag"], json!(["a", "b"]));
    }

    #[test]
    fn test_invalid_json_body() {
        let mut ctx = ctx(ApiRequest::new(Method::POST, "/x").body("{oops", "application/json"));
        let err = ctx.body_data().unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::BadRequest);
        assert_eq!(err.description(), "body json is invalid");
    }

    #[test]
    fn test_non_object_json_body() {
        let mut ctx = ctx(ApiRequest::new(Method::POST, "/x").json(&json!([1, 2])));
        assert_eq!(ctx.body_data().unwrap_err().description(), "body json is invalid");
    }

    #[test]
    fn test_other_content_types_read_as_empty() {
        let mut ctx = ctx(ApiRequest::new(Method::POST, "/x").body("a=1", "text/plain"));
        assert!(ctx.body_data().unwrap().is_empty());

        let mut ctx = self::ctx(ApiRequest::new(Method::POST, "/x").body("", "application/json"));
        assert!(ctx.body_data().unwrap().is_empty());
    }

    #[test]
    fn test_validated_data() {
        let mut ctx = ctx(ApiRequest::new(Method::GET, "/x"));
        let mut cleaned = CleanedData::new();
        cleaned.insert("id", 1);
        ctx.set_request_query(cleaned.clone());
        ctx.set_request_body(cleaned);
        assert_eq!(ctx.request_query().and_then(|q| q.get_i64("id")), Some(1));
        assert!(ctx.request_body().is_some());
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct MyExtension {
            value: i32,
        }

        let mut ctx = ctx(ApiRequest::new(Method::GET, "/"));

        assert!(!ctx.has_extension::<MyExtension>());
        assert!(ctx.get_extension::<MyExtension>().is_none());

        ctx.set_extension(MyExtension { value: 42 });
        assert!(ctx.has_extension::<MyExtension>());
        assert_eq!(ctx.get_extension::<MyExtension>(), Some(&MyExtension { value: 42 }));

        let removed = ctx.remove_extension::<MyExtension>();
        assert_eq!(removed, Some(MyExtension { value: 42 }));
        assert!(!ctx.has_extension::<MyExtension>());
    }

    #[test]
    fn test_elapsed_time() {
        let ctx = ctx(ApiRequest::new(Method::GET, "/"));
        std::thread::sleep(Duration::from_millis(10));
        assert!(ctx.elapsed() >= Duration::from_millis(10));
    }
}
