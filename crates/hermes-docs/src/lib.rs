//! # Hermes Docs
//!
//! OpenAPI 3 documents generated from endpoint metadata.
//!
//! The generator never runs a request. It reads the same validated
//! [`Meta`](hermes_core::Meta) the dispatcher uses and projects its forms,
//! serializer, paginator and declared errors onto an [`OpenApi`] document:
//!
//! | Metadata | Document |
//! |----------|----------|
//! | `method`, path | operation under `paths` |
//! | `tags` | operation tags, plus the tag catalog |
//! | `summary`, `description` | path item |
//! | `query_form`, paginator form | query parameters |
//! | `body_form`, `model_form` | `requestBody` |
//! | `serializer`, `serializer_many` | `200` response and a component |
//! | `errors` | one response per kind and a cached error component |
//!
//! ## Quick Start
//!
//! ```rust
//! use hermes_core::{HttpMethod, MetaLayer};
//! use hermes_docs::DocsGenerator;
//! use hermes_pipeline::{ApiView, Endpoint};
//! use hermes_schema::Value;
//!
//! let ping = ApiView::define(
//!     "Ping",
//!     MetaLayer::new().method(HttpMethod::Get).tags(["health"]),
//!     |_ctx| Ok(Value::from("pong")),
//! )
//! .unwrap();
//!
//! let doc = DocsGenerator::new().generate([("/ping", ping.meta())]).unwrap();
//! assert_eq!(doc.openapi, "3.0.2");
//! assert_eq!(doc.tags[0].name, "health");
//! assert!(doc.to_json().unwrap().contains("\"/ping\""));
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod convert;
mod error;
mod generator;
mod openapi;

pub use error::{DocsError, DocsResult};
pub use generator::{DocsGenerator, DEFAULT_OPENAPI_VERSION, DEFAULT_TITLE, DEFAULT_VERSION};
pub use openapi::{
    Components, Info, JsonSchema, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem,
    RequestBody, Response, SchemaType, Tag,
};
