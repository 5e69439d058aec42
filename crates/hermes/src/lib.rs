//! # Hermes
//!
//! Declarative API endpoints on a fixed request pipeline.
//!
//! An endpoint declares its contract as metadata: HTTP method, tags, query
//! and body forms, serializer, declared errors, pagination. The metadata is
//! validated once when the endpoint is defined. Every request then runs the
//! same stages:
//!
//! ```text
//! MethodCheck → SectionPermissionCheck → QueryValidate → BodyValidate
//!     → Execute → Serialize → Envelope → Render
//! ```
//!
//! and the same metadata produces the OpenAPI document.
//!
//! ## Quick Start
//!
//! ```rust
//! use hermes::prelude::*;
//! use http::Method;
//!
//! # fn main() -> Result<(), hermes::AppError> {
//! let hello = ApiView::define(
//!     "Hello",
//!     MetaLayer::new()
//!         .method(HttpMethod::Get)
//!         .tags(["greetings"])
//!         .set("query_form", Form::new("HelloQuery").with_field("name", FormField::char())),
//!     |ctx| {
//!         let name = ctx.request_query().and_then(|q| q.get_str("name")).unwrap_or("world");
//!         Ok(Value::from(format!("hello {name}")))
//!     },
//! )?;
//!
//! let app = AppBuilder::new(Settings::default())
//!     .log_config(LogConfig::disabled())
//!     .endpoint("/hello", hello)?
//!     .build()?;
//!
//! let response = app
//!     .handle(ApiRequest::new(Method::GET, "/hello").query_param("name", "hermes"))
//!     .expect("no fault");
//! assert_eq!(response.body().as_ref(), br#"{"status":"ok","data":"hello hermes"}"#);
//!
//! let doc = app.openapi()?;
//! assert!(doc.paths.contains_key("/hello"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`core`] | error taxonomy, metadata contracts, caller identity, registries |
//! | [`schema`] | values, serializers, forms, models, data sources |
//! | [`extract`] | request model and body parsers |
//! | [`authz`] | permissions |
//! | [`pipeline`] | dispatcher, renderers, pagination, generic views |
//! | [`docs`] | OpenAPI generation |
//! | [`config`] | settings loading |
//! | [`telemetry`] | logging setup |

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod error;

pub use app::{App, AppBuilder};
pub use error::{AppError, AppResult};

pub use hermes_authz as authz;
pub use hermes_config as config;
pub use hermes_core as core;
pub use hermes_docs as docs;
pub use hermes_extract as extract;
pub use hermes_pipeline as pipeline;
pub use hermes_schema as schema;
pub use hermes_telemetry as telemetry;

pub use hermes_config::{Settings, SettingsLoader};

/// Common imports for defining endpoints.
///
/// ```rust
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{App, AppBuilder, AppError, AppResult, Settings, SettingsLoader};

    pub use hermes_authz::{FnPermission, LoginRequired, Permission, PermissionContext, RoleRequired};
    pub use hermes_core::{ApiError, ApiResult, CallerIdentity, HttpError, HttpErrorKind, HttpMethod, MetaLayer};
    pub use hermes_extract::ApiRequest;
    pub use hermes_pipeline::{
        ApiView, CreateView, DeleteView, Endpoint, FromIdPaginator, GetView, LimitOffsetPaginator, ListView,
        PipelineContext, UpdateView,
    };
    pub use hermes_schema::{
        Form, FormField, MemoryStore, ModelDescriptor, ModelField, ModelForm, ModelSerializer, Schema,
        SchemaField, StorageKind, Value,
    };
    pub use hermes_telemetry::LogConfig;
}
