//! In-memory test client.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::Serialize;

use hermes_core::CallerIdentity;
use hermes_extract::ApiRequest;

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

type Handler = Arc<dyn Fn(ApiRequest) -> http::Response<Bytes> + Send + Sync>;

/// Drives an application without a network.
///
/// The client wraps whatever turns an [`ApiRequest`] into a response,
/// usually `App::handle`.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use hermes_test::TestClient;
/// use http::StatusCode;
///
/// let client = TestClient::new(|request| {
///     let body = format!(r#"{{"status":"ok","data":"{}"}}"#, request.path());
///     http::Response::new(Bytes::from(body))
/// });
///
/// let response = client.get("/ping").send();
/// response.assert_status(StatusCode::OK);
/// assert_eq!(response.data().unwrap(), "/ping");
/// ```
#[derive(Clone)]
#[must_use]
pub struct TestClient {
    handler: Handler,
    default_headers: Vec<(String, String)>,
    default_identity: CallerIdentity,
}

impl TestClient {
    /// A client over a request handler.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(ApiRequest) -> http::Response<Bytes> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            default_headers: Vec::new(),
            default_identity: CallerIdentity::Anonymous,
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sends every request as `identity` unless a request overrides it.
    pub fn with_identity(mut self, identity: CallerIdentity) -> Self {
        self.default_identity = identity;
        self
    }

    /// Starts a GET request.
    pub fn get(&self, path: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::GET, path)
    }

    /// Starts a POST request.
    pub fn post(&self, path: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::POST, path)
    }

    /// Starts a PUT request.
    pub fn put(&self, path: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PUT, path)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, path: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, path)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, path: impl Into<String>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, path).identity(self.default_identity.clone());
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest { client: self, builder }
    }
}

impl fmt::Debug for TestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClient")
            .field("default_headers", &self.default_headers)
            .field("default_identity", &self.default_identity)
            .finish_non_exhaustive()
    }
}

/// A request bound to a [`TestClient`].
#[derive(Debug)]
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the caller identity.
    pub fn identity(mut self, identity: CallerIdentity) -> Self {
        self.builder = self.builder.identity(identity);
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<Bytes>, content_type: &str) -> Self {
        self.builder = self.builder.body(body, content_type);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built.
    pub fn send(self) -> TestResponse {
        match self.try_send() {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request, reporting build errors.
    pub fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?.into_api_request();
        let response = (self.client.handler)(request);
        Ok(TestResponse::from_response(response))
    }
}
