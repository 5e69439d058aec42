use std::sync::Arc;

use hermes_authz::Permission;
use hermes_core::{
    ApiResult, Expected, HttpError, HttpErrorKind, HttpMethod, IncorrectMeta, Meta, MetaLayer, MetaRule,
    MetaSchema, KIND_MODEL,
};
use hermes_schema::Value;

use super::{declared_model_form, define_meta, model_schema, view_builders, with_model_form, Permissions};
use crate::context::PipelineContext;
use crate::endpoint::Endpoint;

/// Validates the body with `model_form` and stores a new row.
#[derive(Debug, Clone)]
pub struct CreateView {
    meta: Meta,
    permissions: Permissions,
}

impl CreateView {
    const NEEDS_MODEL_FORM: bool = true;

    /// Abstract base metadata.
    #[must_use]
    pub fn base_layer() -> MetaLayer {
        MetaLayer::new()
            .method(HttpMethod::Post)
            .errors([HttpErrorKind::FormError])
    }

    /// Rules for the merged metadata.
    ///
    /// `model` is optional here: the model form knows its model.
    #[must_use]
    pub fn meta_schema() -> MetaSchema {
        with_model_form(
            model_schema().rule("model", MetaRule::optional(Expected::SubclassOf(KIND_MODEL))),
        )
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

view_builders!(CreateView);

impl Endpoint for CreateView {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn section_permissions(&self) -> &[Arc<dyn Permission>] {
        &self.permissions.section
    }

    fn execute(&self, ctx: &mut PipelineContext) -> ApiResult<Value> {
        let model_form = declared_model_form(&self.meta)?;
        let body = ctx.body_data()?;
        let cleaned = model_form.validate(&body).map_err(HttpError::form)?;
        let row = model_form.save(&cleaned, None)?;
        Ok(row.into_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::views::fixtures;
    use hermes_extract::ApiRequest;
    use hermes_schema::{Form, FormField, ModelForm};
    use http::{Method, StatusCode};
    use serde_json::{json, Value as Json};

    fn body(response: &http::Response<bytes::Bytes>) -> Json {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_create() {
        let store = fixtures::store();
        let model_form = ModelForm::builder("SomeForm", store.model()).build().unwrap();
        let view = CreateView::define(
            "CreateSome",
            MetaLayer::new().tags(["some"]).set("model_form", model_form),
        )
        .unwrap();
        let dispatcher = Dispatcher::default();

        let response = dispatcher
            .dispatch(&view, ApiRequest::new(Method::POST, "/some/create"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body(&response)["field_problems"],
            json!({
                "i": ["This field is required."],
                "f": ["This field is required."],
                "nullable": ["This field is required."]
            })
        );

        let response = dispatcher
            .dispatch(
                &view,
                ApiRequest::new(Method::POST, "/some/create")
                    .json(&json!({"i": 1, "f": 2.5, "nullable": "x"})),
            )
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body(&response),
            json!({
                "status": "ok",
                "data": {
                    "id": 1,
                    "i": 1,
                    "f": 2.5,
                    "nullable": "x",
                    "created": "2020-02-28T16:00:00+00:00"
                }
            })
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_plain_form_is_rejected() {
        let err = CreateView::define(
            "CreateSome",
            MetaLayer::new()
                .tags(["some"])
                .set("model_form", Form::new("Plain").with_field("i", FormField::integer())),
        )
        .unwrap_err();
        assert_eq!(
            err.errors(),
            ["`model_form` has incorrect type, should be subclass of `ModelForm`"]
        );
    }

    #[test]
    fn test_model_form_is_required() {
        let err = CreateView::define("CreateNothing", MetaLayer::new().tags(["x"])).unwrap_err();
        assert_eq!(err.errors(), ["`model_form` is required"]);
    }
}
