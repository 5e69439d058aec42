//! Envelopes and renderers.
//!
//! Every response leaves the pipeline in one of two shapes:
//!
//! ```json
//! {"status": "ok", "data": <result>}
//! {"status": "<alias>", "message": "<description>", "data": {}, "field_problems": {...}}
//! ```
//!
//! A [`Renderer`] turns the envelope into bytes. Only JSON ships built in.

use std::fmt;

use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use serde_json::{json, Value as Json};

use hermes_core::HttpError;

/// The response type produced by the pipeline.
pub type Response = http::Response<Bytes>;

/// Wraps a serialized result in the success envelope.
#[must_use]
pub fn success_envelope(data: Json) -> Json {
    json!({"status": "ok", "data": data})
}

/// The error envelope for an HTTP error.
#[must_use]
pub fn error_envelope(error: &HttpError) -> Json {
    error.get_dict()
}

/// Writes an envelope as a response.
pub trait Renderer: fmt::Debug + Send + Sync {
    /// Media type of rendered bodies.
    fn media_type(&self) -> &'static str;

    /// Encodes `payload` with the given status.
    fn render(&self, status: StatusCode, payload: &Json) -> Response;

    /// Renders an error envelope with the error's status code.
    fn render_error(&self, error: &HttpError) -> Response {
        self.render(error.status_code(), &error_envelope(error))
    }
}

/// `application/json` renderer.
///
/// # Example
///
/// ```rust
/// use hermes_pipeline::{success_envelope, JsonRenderer, Renderer};
/// use http::StatusCode;
///
/// let response = JsonRenderer.render(StatusCode::OK, &success_envelope(serde_json::json!({"id": 1})));
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body().as_ref(), br#"{"status":"ok","data":{"id":1}}"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn media_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, status: StatusCode, payload: &Json) -> Response {
        let mut response = Response::new(Bytes::from(payload.to_string()));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

/// Looks up a built-in renderer by settings name.
#[must_use]
pub fn renderer_by_name(name: &str) -> Option<Box<dyn Renderer>> {
    match name {
        "json" => Some(Box::new(JsonRenderer)),
        _ => None,
    }
}
