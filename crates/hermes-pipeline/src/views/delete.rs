use std::sync::Arc;

use indexmap::IndexMap;

use hermes_authz::Permission;
use hermes_core::{ApiResult, HttpErrorKind, HttpMethod, IncorrectMeta, Meta, MetaLayer, MetaSchema};
use hermes_schema::{Form, FormField, Value};

use super::{declared_model, define_meta, load_object, object_key, object_schema, view_builders, Permissions};
use crate::context::PipelineContext;
use crate::endpoint::Endpoint;

/// Looks a row up by `request_body[object_key]` and deletes it.
///
/// Responds with empty data.
#[derive(Debug, Clone)]
pub struct DeleteView {
    meta: Meta,
    permissions: Permissions,
}

impl DeleteView {
    const NEEDS_MODEL_FORM: bool = false;

    /// Abstract base metadata.
    #[must_use]
    pub fn base_layer() -> MetaLayer {
        MetaLayer::new()
            .method(HttpMethod::Post)
            .set("body_form", Form::new("DeleteBody").with_field("id", FormField::integer()))
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

view_builders!(DeleteView, object);

impl Endpoint for DeleteView {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn section_permissions(&self) -> &[Arc<dyn Permission>] {
        &self.permissions.section
    }

    fn execute(&self, ctx: &mut PipelineContext) -> ApiResult<Value> {
        let key = object_key(&self.meta);
        let key_value = ctx.request_body().and_then(|b| b.get(key)).cloned();
        let row = load_object(&self.meta, &self.permissions.object, ctx, key_value.as_ref())?;

        declared_model(&self.meta)?.source().delete(row.pk())?;
        Ok(Value::Map(IndexMap::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::views::fixtures;
    use hermes_extract::ApiRequest;
    use http::{Method, StatusCode};
    use serde_json::{json, Value as Json};

    #[test]
    fn test_delete() {
        let store = fixtures::store();
        fixtures::insert(&store, 1, "a");
        fixtures::insert(&store, 2, "without_permissions");
        let view = DeleteView::define(
            "DeleteSome",
            MetaLayer::new().tags(["some"]).set("model", store.model()),
        )
        .unwrap()
        .object_permission(fixtures::hide_restricted());
        let dispatcher = Dispatcher::default();
        let delete = |payload: Json| {
            let response = dispatcher
                .dispatch(&view, ApiRequest::new(Method::POST, "/some/delete").json(&payload))
                .unwrap();
            let body: Json = serde_json::from_slice(response.body()).unwrap();
            (response.status(), body)
        };

        let (status, body) = delete(json!({}));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field_problems"], json!({"id": ["This field is required."]}));

        assert_eq!(delete(json!({"id": 3})).0, StatusCode::NOT_FOUND);
        assert_eq!(delete(json!({"id": 2})).0, StatusCode::FORBIDDEN);

        let (status, body) = delete(json!({"id": 1}));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "data": {}}));
        assert_eq!(store.len(), 1);

        assert_eq!(delete(json!({"id": 1})).0, StatusCode::NOT_FOUND);
    }
}
