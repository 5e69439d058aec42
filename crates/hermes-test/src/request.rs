//! Test request building.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;

use hermes_core::CallerIdentity;
use hermes_extract::{ApiRequest, QueryParams};

use crate::error::TestError;

/// A request ready to be handed to an application.
#[derive(Debug, Clone)]
pub struct TestRequest {
    /// HTTP method.
    pub method: Method,
    /// Path without query string.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
    /// Caller identity.
    pub identity: CallerIdentity,
}

impl TestRequest {
    /// Starts a GET request.
    pub fn get(path: impl Into<String>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, path)
    }

    /// Starts a POST request.
    pub fn post(path: impl Into<String>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, path)
    }

    /// Query string in `application/x-www-form-urlencoded` form.
    #[must_use]
    pub fn query_string(&self) -> String {
        self.query_params().to_query_string()
    }

    fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        for (key, value) in &self.query {
            params.append(key.clone(), value.clone());
        }
        params
    }

    /// Converts to the pipeline's request model.
    #[must_use]
    pub fn into_api_request(self) -> ApiRequest {
        let query = self.query_params();
        let mut request = ApiRequest::new(self.method, self.path)
            .with_query(query)
            .identity(self.identity);
        let content_type = self
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        for (name, value) in &self.headers {
            if let Ok(value) = value.to_str() {
                request = request.header(name.clone(), value);
            }
        }
        if !self.body.is_empty() {
            request = request.body(self.body, content_type.as_deref().unwrap_or("application/octet-stream"));
        }
        request
    }

    /// Converts to an `http` request. The identity travels as a request
    /// extension.
    pub fn into_http_request(self) -> Result<http::Request<Bytes>, TestError> {
        let query = self.query_string();
        let uri = if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{query}", self.path)
        };

        let mut builder = http::Request::builder().method(self.method).uri(uri);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        builder = builder.extension(self.identity);
        builder
            .body(self.body)
            .map_err(|e| TestError::RequestBuild(e.to_string()))
    }
}

/// Builder for [`TestRequest`].
///
/// Invalid headers and unserializable bodies are remembered and reported
/// by [`TestRequestBuilder::build`].
#[derive(Debug)]
#[must_use]
pub struct TestRequestBuilder {
    request: TestRequest,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Starts a request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request: TestRequest {
                method,
                path: path.into(),
                query: Vec::new(),
                headers: HeaderMap::new(),
                body: Bytes::new(),
                identity: CallerIdentity::Anonymous,
            },
            error: None,
        }
    }

    /// Appends a query parameter. Repeating a key sends a list.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.request.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = match HeaderName::try_from(name.as_ref()) {
            Ok(name) => name,
            Err(e) => return self.fail(TestError::InvalidHeader(format!("{}: {e}", name.as_ref()))),
        };
        match HeaderValue::try_from(value.as_ref()) {
            Ok(value) => {
                self.request.headers.insert(name, value);
                self
            }
            Err(e) => self.fail(TestError::InvalidHeader(format!("{name}: {e}"))),
        }
    }

    /// Sets the caller identity.
    pub fn identity(mut self, identity: CallerIdentity) -> Self {
        self.request.identity = identity;
        self
    }

    /// Sets a raw body with its content type.
    pub fn body(mut self, body: impl Into<Bytes>, content_type: &str) -> Self {
        self.request.body = body.into();
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body(bytes, "application/json"),
            Err(e) => self.fail(e.into()),
        }
    }

    /// Finishes the request.
    pub fn build(self) -> Result<TestRequest, TestError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.request),
        }
    }

    fn fail(mut self, error: TestError) -> Self {
        self.error.get_or_insert(error);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_collects_parts() {
        let request = TestRequest::post("/notes/create")
            .query("dry_run", 1)
            .identity(CallerIdentity::user("u-1"))
            .json(&json!({"text": "hi"}))
            .build()
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.query, vec![("dry_run".to_string(), "1".to_string())]);
        assert_eq!(request.headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(&request.body[..], br#"{"text":"hi"}"#);
    }

    #[test]
    fn test_invalid_header_is_reported_at_build() {
        let err = TestRequest::get("/").header("bad header", "x").build().unwrap_err();
        assert!(matches!(err, TestError::InvalidHeader(_)));
    }

    #[test]
    fn test_into_api_request() {
        let request = TestRequest::get("/notes")
            .query("tag", "a")
            .query("tag", "b")
            .identity(CallerIdentity::user("u-1"))
            .build()
            .unwrap()
            .into_api_request();

        assert_eq!(request.path(), "/notes");
        assert_eq!(request.query().get_all("tag"), ["a", "b"]);
        assert!(request.caller().is_authenticated());
        assert!(request.body_bytes().is_empty());
    }

    #[test]
    fn test_into_http_request_carries_identity() {
        let request = TestRequest::get("/notes/get")
            .query("id", 2)
            .identity(CallerIdentity::user("u-1"))
            .build()
            .unwrap()
            .into_http_request()
            .unwrap();

        assert_eq!(request.uri().path(), "/notes/get");
        assert_eq!(request.uri().query(), Some("id=2"));
        assert_eq!(
            request.extensions().get::<CallerIdentity>(),
            Some(&CallerIdentity::user("u-1"))
        );
    }
}
