//! # Hermes Schema
//!
//! Serialization, validation and storage-model plumbing for Hermes endpoints.
//!
//! - [`Value`] / [`Record`] - native values flowing through a pipeline
//! - [`Schema`] / [`SchemaField`] - output serializers, with [`ResolverChain`]
//!   deciding where each field's value comes from
//! - [`Form`] / [`FormField`] - input validation producing [`CleanedData`]
//! - [`FieldMapping`] - kind tables used to derive schemas from forms and models
//! - [`ModelDescriptor`], [`ModelSerializer`], [`ModelForm`] - model-driven
//!   serializers and forms
//! - [`DataSource`] / [`QuerySet`] - ordered, lazily evaluated data access,
//!   with [`MemoryStore`] as the in-process implementation
//!
//! ## Example
//!
//! ```
//! use hermes_schema::{MemoryStore, ModelDescriptor, ModelField, ModelSerializer, StorageKind};
//! use indexmap::IndexMap;
//!
//! let store = MemoryStore::new(
//!     ModelDescriptor::new("Note")
//!         .field(ModelField::new("id", StorageKind::Auto))
//!         .field(ModelField::new("text", StorageKind::Text)),
//! );
//! let model = store.model();
//! let serializer = ModelSerializer::new("NoteSerializer")
//!     .model(model.descriptor().clone())
//!     .build()
//!     .unwrap();
//!
//! let mut values = IndexMap::new();
//! values.insert("text".to_string(), "hello".into());
//! let row = model.source().insert(values).unwrap();
//!
//! let json = serializer.dump(&row.into_value()).unwrap();
//! assert_eq!(json, serde_json::json!({"id": 1, "text": "hello"}));
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod field;
mod form;
mod mapping;
mod memory;
mod meta_ext;
mod model;
mod model_form;
mod model_serializer;
mod resolve;
mod schema;
mod store;
mod value;

pub use error::{
    DefinitionErrors, FormDefinitionError, MappingError, SerializeError,
    SerializerDefinitionError, StoreError, StoreResult,
};
pub use field::{FieldKind, SchemaField};
pub use form::{CleanedData, Form, FormData, FormField, FormFieldKind};
pub use mapping::{schema_from_form, FieldMapping};
pub use memory::{Clock, FixedClock, MemoryStore, SystemClock};
pub use meta_ext::MetaExt;
pub use model::{ModelDescriptor, ModelField, Row, StorageKind};
pub use model_form::{ModelForm, ModelFormBuilder};
pub use model_serializer::ModelSerializer;
pub use resolve::{
    AttributeResolver, FnResolver, MappingResolver, MethodResolver, Resolver, ResolverChain,
};
pub use schema::Schema;
pub use store::{Condition, DataSource, Lookup, Model, OrderBy, Query, QuerySet};
pub use value::{FileRef, Record, Value};
