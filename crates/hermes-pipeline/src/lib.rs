//! # Hermes Pipeline
//!
//! The fixed-order request pipeline of the Hermes toolkit, with pagination
//! and generic model views built on top of it.
//!
//! Every request runs the same stages; none can be skipped or reordered.
//!
//! ```text
//! Request → MethodCheck → SectionPermissionCheck → QueryValidate → BodyValidate
//!                                                                       ↓
//! Response ← Render ← Envelope ← Serialize ←─────────────────────── Execute
//! ```
//!
//! | Stage | Reads | Fails with |
//! |-------|-------|------------|
//! | 1 MethodCheck | `Meta.method` | `NotImplemented` (405) |
//! | 2 SectionPermissionCheck | section permissions | `AuthRequired` (401) / `Forbidden` (403) |
//! | 3 QueryValidate | `query_form` | `FormError` (400) |
//! | 4 BodyValidate | `body_form` | `BadRequest` / `FormError` (400) |
//! | 5 Execute | the endpoint | any [`HttpError`](hermes_core::HttpError), or a fault |
//! | 6 Serialize | `serializer`, `serializer_many` | fault |
//! | 7 Envelope | | |
//! | 8 Render | the renderer | |
//!
//! Faults (an [`ApiError::Fault`](hermes_core::ApiError::Fault) or a panic)
//! render as a 500 unless the dispatcher runs in debug mode.
//!
//! ## Example
//!
//! ```
//! use hermes_pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 8);
//! assert_eq!(stages[0].name(), "method_check");
//! assert_eq!(stages[7].name(), "render");
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
mod dispatcher;
mod endpoint;
mod error;
pub mod pagination;
mod render;
mod stage;
pub mod views;

pub use context::PipelineContext;
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use endpoint::{ApiView, Endpoint};
pub use error::PipelineError;
pub use pagination::{FromIdPaginator, LimitOffsetPaginator, PageInfo, Pagination, Paginator, PaginatorRef};
pub use render::{error_envelope, renderer_by_name, success_envelope, JsonRenderer, Renderer, Response};
pub use stage::Stage;
pub use views::{CreateView, DeleteView, GetView, ListPage, ListView, UpdateView};
