//! # Hermes Extract
//!
//! Reading input out of a request.
//!
//! | Item | Source | Description |
//! |------|--------|-------------|
//! | [`ApiRequest`] | whole request | Method, path, query, headers, body and caller |
//! | [`QueryParams`] | query string | Decoded parameters, repeated keys preserved |
//! | [`Parser`] | request body | Media-type specific body decoding ([`JsonParser`]) |
//!
//! Every failure is an [`ExtractionError`], which renders as a `BadRequest`.
//!
//! ## Example
//!
//! ```rust
//! use hermes_extract::{ApiRequest, JsonParser, Parser};
//! use http::Method;
//!
//! let request = ApiRequest::new(Method::POST, "/notes/create")
//!     .json(&serde_json::json!({"text": "hi"}));
//!
//! let parser = JsonParser;
//! assert!(parser.accepts(request.content_type()));
//! let body = parser.parse_object(request.body_bytes()).unwrap();
//! assert_eq!(body["text"], "hi");
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod parser;
mod query;
mod request;

pub use error::{ExtractionError, ExtractionSource};
pub use parser::{parser_by_name, JsonParser, Parser};
pub use query::QueryParams;
pub use request::ApiRequest;
