use std::sync::Arc;

use hermes_authz::Permission;
use hermes_core::{ApiResult, HttpError, HttpErrorKind, HttpMethod, IncorrectMeta, Meta, MetaLayer, MetaSchema};
use hermes_schema::{Form, FormField, Value};

use super::{
    declared_model_form, define_meta, load_object, object_key, object_schema, view_builders, with_model_form,
    Permissions,
};
use crate::context::PipelineContext;
use crate::endpoint::Endpoint;

/// Looks a row up by `request_body[object_key]`, then validates the body
/// with `model_form` and saves it over the row.
#[derive(Debug, Clone)]
pub struct UpdateView {
    meta: Meta,
    permissions: Permissions,
}

impl UpdateView {
    const NEEDS_MODEL_FORM: bool = true;

    /// Abstract base metadata.
    #[must_use]
    pub fn base_layer() -> MetaLayer {
        MetaLayer::new()
            .method(HttpMethod::Post)
            .set("body_form", Form::new("UpdateBody").with_field("id", FormField::integer()))
            .errors([HttpErrorKind::FormError, HttpErrorKind::NotFound, HttpErrorKind::Forbidden])
    }

    /// Rules for the merged metadata.
    #[must_use]
    pub fn meta_schema() -> MetaSchema {
        with_model_form(object_schema())
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

view_builders!(UpdateView, object);

impl Endpoint for UpdateView {
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

        let model_form = declared_model_form(&self.meta)?;
        let body = ctx.body_data()?;
        let cleaned = model_form.validate(&body).map_err(HttpError::form)?;
        Ok(model_form.save(&cleaned, Some(&row))?.into_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::views::fixtures;
    use hermes_extract::ApiRequest;
    use hermes_schema::{MemoryStore, ModelForm};
    use http::{Method, StatusCode};
    use serde_json::{json, Value as Json};

    fn body(response: &http::Response<bytes::Bytes>) -> Json {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn view(store: &MemoryStore) -> UpdateView {
        let model_form = ModelForm::builder("SomeForm", store.model()).build().unwrap();
        UpdateView::define(
            "UpdateSome",
            MetaLayer::new()
                .tags(["some"])
                .set("model", store.model())
                .set("model_form", model_form),
        )
        .unwrap()
        .object_permission(fixtures::hide_restricted())
    }

    fn update(view: &UpdateView, payload: &Json) -> http::Response<bytes::Bytes> {
        Dispatcher::default()
            .dispatch(view, ApiRequest::new(Method::POST, "/some/update").json(payload))
            .unwrap()
    }

    #[test]
    fn test_update() {
        let store = fixtures::store();
        fixtures::insert(&store, 1, "before");
        let view = view(&store);

        let response = update(&view, &json!({"id": 1, "i": 7, "f": 0.5, "nullable": "after"}));
        assert_eq!(response.status(), StatusCode::OK);
        let data = &body(&response)["data"];
        assert_eq!(data["id"], 1);
        assert_eq!(data["i"], 7);
        assert_eq!(data["nullable"], "after");
        assert_eq!(data["created"], "2020-02-28T16:00:00+00:00");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_errors() {
        let store = fixtures::store();
        fixtures::insert(&store, 1, "without_permissions");
        let view = view(&store);

        let response = update(&view, &json!({}));
        assert_eq!(
            body(&response)["field_problems"],
            json!({"id": ["This field is required."]})
        );

        let response = update(&view, &json!({"id": 2, "i": 1, "f": 1.0, "nullable": "x"}));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = update(&view, &json!({"id": 1, "i": 1, "f": 1.0, "nullable": "x"}));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_model_form_errors_after_lookup() {
        let store = fixtures::store();
        fixtures::insert(&store, 1, "x");
        let response = update(&view(&store), &json!({"id": 1, "i": "many"}));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let problems = &body(&response)["field_problems"];
        assert_eq!(problems["i"], json!(["Enter a whole number."]));
        assert_eq!(problems["f"], json!(["This field is required."]));
    }
}
