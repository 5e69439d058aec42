//! # Hermes Core
//!
//! Foundational types shared by every Hermes crate:
//!
//! - [`HttpError`] / [`HttpErrorKind`] - the error kinds a pipeline can render
//! - [`ApiError`] - what endpoint business logic returns
//! - [`Meta`] - validated, merged endpoint metadata ([`MetaLayer`], [`MetaSchema`])
//! - [`CallerIdentity`] - who is calling
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Registry`] - write-once, read-many tables

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod identity;
pub mod meta;
pub mod registry;
mod request_id;

pub use error::{ApiError, ApiResult, FieldErrors, HttpError, HttpErrorKind};
pub use identity::CallerIdentity;
pub use meta::{
    CapabilityRef, Expected, HttpMethod, IncorrectMeta, Meta, MetaLayer, MetaRule, MetaSchema,
    MetaValue, ValueType, KIND_FORM, KIND_MODEL, KIND_PAGINATOR, KIND_SERIALIZER,
};
pub use registry::{Registry, RegistryBuilder, RegistryError};
pub use request_id::RequestId;
