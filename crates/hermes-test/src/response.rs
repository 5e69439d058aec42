//! Test response wrapper.

use std::fmt;

use bytes::Bytes;
use http::{header, HeaderMap, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

use crate::error::TestError;

/// A response with assertion helpers.
///
/// Assertions panic with the response body in the message, so a failing
/// test shows what the application actually rendered.
#[derive(Debug, Clone)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body bytes.
    pub body: Bytes,
}

impl TestResponse {
    /// Wraps a buffered response.
    #[must_use]
    pub fn from_response(response: http::Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Collects a streaming body.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: BodyExt,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();
        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Status code as a number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec()).map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The `data` member of the envelope.
    pub fn data(&self) -> Result<Json, TestError> {
        let mut envelope: Json = self.json()?;
        Ok(envelope.get_mut("data").map(Json::take).unwrap_or(Json::Null))
    }

    /// Asserts the status code.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {}; body: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts the whole JSON body.
    pub fn assert_json(&self, expected: &Json) -> &Self {
        match self.json::<Json>() {
            Ok(actual) => assert_eq!(&actual, expected, "JSON body mismatch"),
            Err(e) => panic!("body is not JSON ({e}): {}", String::from_utf8_lossy(&self.body)),
        }
        self
    }

    /// Asserts the envelope `status` member (`ok`, `not_found`, ...).
    pub fn assert_envelope_status(&self, alias: &str) -> &Self {
        match self.json::<Json>() {
            Ok(actual) => assert_eq!(actual["status"], alias, "envelope status mismatch: {actual}"),
            Err(e) => panic!("body is not JSON ({e}): {}", String::from_utf8_lossy(&self.body)),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use serde_json::json;

    fn response(status: StatusCode, body: &str) -> TestResponse {
        TestResponse::from_response(
            http::Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Bytes::from(body.to_string()))
                .unwrap(),
        )
    }

    #[test]
    fn test_json_helpers() {
        let response = response(StatusCode::OK, r#"{"status":"ok","data":{"id":3}}"#);
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.data().unwrap(), json!({"id": 3}));
        response
            .assert_status(StatusCode::OK)
            .assert_envelope_status("ok")
            .assert_json(&json!({"status": "ok", "data": {"id": 3}}));
    }

    #[test]
    #[should_panic(expected = "expected status 404 Not Found")]
    fn test_assert_status_failure() {
        response(StatusCode::OK, "{}").assert_status(StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_text_and_invalid_json() {
        let response = response(StatusCode::OK, "plain");
        assert_eq!(response.text().unwrap(), "plain");
        assert!(matches!(response.json::<Json>(), Err(TestError::Json(_))));
    }

    #[test]
    fn test_from_http_collects_body() {
        let http = http::Response::builder()
            .status(StatusCode::CREATED)
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        let response = tokio_test::block_on(TestResponse::from_http(http)).unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.json::<Json>().unwrap(), json!({}));
    }
}
