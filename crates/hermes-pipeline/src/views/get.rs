use std::sync::Arc;

use hermes_authz::Permission;
use hermes_core::{ApiResult, HttpErrorKind, HttpMethod, IncorrectMeta, Meta, MetaLayer, MetaSchema};
use hermes_schema::{Form, FormField, Value};

use super::{define_meta, load_object, object_key, object_schema, view_builders, Permissions};
use crate::context::PipelineContext;
use crate::endpoint::Endpoint;

/// Returns one row, looked up by `request_query[object_key]`.
///
/// A missing row is `NotFound`; a row failing an object permission is
/// `Forbidden`.
///
/// # Example
///
/// ```rust
/// use hermes_core::MetaLayer;
/// use hermes_pipeline::GetView;
/// use hermes_schema::{MemoryStore, ModelDescriptor, ModelField, StorageKind};
///
/// let store = MemoryStore::new(
///     ModelDescriptor::new("Note").field(ModelField::new("id", StorageKind::Auto)),
/// );
/// let view = GetView::define(
///     "GetNote",
///     MetaLayer::new().tags(["notes"]).set("model", store.model()),
/// )
/// .unwrap();
/// assert_eq!(view.meta().method().as_str(), "GET");
/// ```
#[derive(Debug, Clone)]
pub struct GetView {
    meta: Meta,
    permissions: Permissions,
}

impl GetView {
    const NEEDS_MODEL_FORM: bool = false;

    /// Abstract base metadata.
    #[must_use]
    pub fn base_layer() -> MetaLayer {
        MetaLayer::new()
            .method(HttpMethod::Get)
            .set("query_form", Form::new("GetQuery").with_field("id", FormField::integer()))
            .errors([HttpErrorKind::FormError, HttpErrorKind::NotFound, HttpErrorKind::Forbidden])
    }

    /// Rules for the merged metadata.
    #[must_use]
    pub fn meta_schema() -> MetaSchema {
        object_schema()
    }

    /// Merges `layer` over the base metadata and validates it.
    pub fn define(class_name: &str, layer: MetaLayer) -> Result<Self, IncorrectMeta> {
        let layer = layer.over(&Self::base_layer());
        Ok(Self {
            meta: define_meta(class_name, None, layer, &Self::meta_schema(), Self::NEEDS_MODEL_FORM)?,
            permissions: Permissions::default(),
        })
    }
}

view_builders!(GetView, object);

impl Endpoint for GetView {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn section_permissions(&self) -> &[Arc<dyn Permission>] {
        &self.permissions.section
    }

    fn execute(&self, ctx: &mut PipelineContext) -> ApiResult<Value> {
        let key = object_key(&self.meta);
        let key_value = ctx.request_query().and_then(|q| q.get(key)).cloned();
        let row = load_object(&self.meta, &self.permissions.object, ctx, key_value.as_ref())?;
        Ok(row.into_value())
    }
}
