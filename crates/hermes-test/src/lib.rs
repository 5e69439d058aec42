//! # Hermes Test
//!
//! In-memory testing for Hermes applications: no sockets, no runtime.
//!
//! [`TestClient`] wraps the function that handles an [`ApiRequest`]
//! (normally `App::handle`), so requests run through the complete
//! dispatcher including validation, permissions and rendering.
//!
//! ## Example
//!
//! ```ignore
//! use hermes_test::TestClient;
//! use http::StatusCode;
//!
//! let client = TestClient::new(move |request| app.handle(request));
//!
//! client
//!     .get("/notes/get")
//!     .query("id", 42)
//!     .send()
//!     .assert_status(StatusCode::NOT_FOUND)
//!     .assert_envelope_status("not_found");
//!
//! let response = client
//!     .post("/notes/create")
//!     .json(&serde_json::json!({"text": "hello"}))
//!     .send();
//! assert_eq!(response.data().unwrap()["text"], "hello");
//! ```
//!
//! [`ApiRequest`]: hermes_extract::ApiRequest

#![doc(html_root_url = "https://docs.rs/hermes-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
