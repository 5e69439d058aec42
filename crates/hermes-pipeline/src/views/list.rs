use std::fmt;
use std::sync::Arc;

use hermes_authz::Permission;
use hermes_core::{
    ApiResult, Expected, HttpMethod, IncorrectMeta, Meta, MetaLayer, MetaRule, MetaSchema, KIND_PAGINATOR,
};
use hermes_schema::{Model, QuerySet, Value};

use super::{declared_model, define_meta, model_schema, rows_value, view_builders, Permissions};
use crate::context::PipelineContext;
use crate::endpoint::Endpoint;
use crate::pagination::{Pagination, PaginatorRef};

/// What a list response is built from.
#[derive(Debug)]
pub struct ListPage<'a> {
    /// The full, ordered query set.
    pub queryset: &'a QuerySet,
    /// The query set after pagination (the full one without a paginator).
    pub page: &'a QuerySet,
    /// Request pagination state, when a paginator is declared.
    pub pagination: Option<&'a Pagination<'a>>,
}

type QuerySetHook = Arc<dyn Fn(&PipelineContext, &Model) -> ApiResult<QuerySet> + Send + Sync>;
type ResponseHook = Arc<dyn Fn(&ListPage<'_>) -> ApiResult<Value> + Send + Sync>;

/// Lists rows of `model`, optionally paginated.
///
/// The query set defaults to every row ordered by primary key and the
/// response to the rows of the page. Both can be replaced.
///
/// # Example
///
/// ```rust
/// use hermes_core::MetaLayer;
/// use hermes_pipeline::{ListView, LimitOffsetPaginator};
/// use hermes_schema::{MemoryStore, ModelDescriptor, ModelField, StorageKind, Value};
///
/// let store = MemoryStore::new(
///     ModelDescriptor::new("Note").field(ModelField::new("id", StorageKind::Auto)),
/// );
/// let view = ListView::define(
///     "ListNotes",
///     MetaLayer::new()
///         .tags(["notes"])
///         .set("model", store.model())
///         .set("paginator", LimitOffsetPaginator::new()),
/// )
/// .unwrap()
/// .response(|page| {
///     let count = page.queryset.count()?;
///     Ok(Value::from(i64::try_from(count).unwrap_or_default()))
/// });
/// assert!(view.meta().serializer_many());
/// ```
#[derive(Clone)]
pub struct ListView {
    meta: Meta,
    permissions: Permissions,
    queryset: Option<QuerySetHook>,
    response: Option<ResponseHook>,
}

impl ListView {
    const NEEDS_MODEL_FORM: bool = false;

    /// Abstract base metadata.
    #[must_use]
    pub fn base_layer() -> MetaLayer {
        MetaLayer::new().method(HttpMethod::Get).serializer_many(true)
    }

    /// Rules for the merged metadata.
    #[must_use]
    pub fn meta_schema() -> MetaSchema {
        model_schema().rule("paginator", MetaRule::optional(Expected::SubclassOf(KIND_PAGINATOR)))
    }

    /// Merges `layer` over the base metadata and validates it.
    pub fn define(class_name: &str, layer: MetaLayer) -> Result<Self, IncorrectMeta> {
        let layer = layer.over(&Self::base_layer());
        Ok(Self {
            meta: define_meta(class_name, None, layer, &Self::meta_schema(), Self::NEEDS_MODEL_FORM)?,
            permissions: Permissions::default(),
            queryset: None,
            response: None,
        })
    }

    /// Replaces the query set.
    #[must_use]
    pub fn queryset<F>(mut self, f: F) -> Self
    where
        F: Fn(&PipelineContext, &Model) -> ApiResult<QuerySet> + Send + Sync + 'static,
    {
        self.queryset = Some(Arc::new(f));
        self
    }

    /// Replaces the response builder.
    #[must_use]
    pub fn response<F>(mut self, f: F) -> Self
    where
        F: Fn(&ListPage<'_>) -> ApiResult<Value> + Send + Sync + 'static,
    {
        self.response = Some(Arc::new(f));
        self
    }

    fn build_queryset(&self, ctx: &PipelineContext, model: &Model) -> ApiResult<QuerySet> {
        match &self.queryset {
            Some(hook) => hook(ctx, model),
            None => Ok(model.objects().order_by(model.descriptor().pk_name())),
        }
    }

    fn build_response(&self, page: &ListPage<'_>) -> ApiResult<Value> {
        match &self.response {
            Some(hook) => hook(page),
            None => Ok(rows_value(page.page.fetch()?)),
        }
    }
}

view_builders!(ListView);

impl fmt::Debug for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView")
            .field("meta", &self.meta)
            .field("permissions", &self.permissions)
            .field("custom_queryset", &self.queryset.is_some())
            .field("custom_response", &self.response.is_some())
            .finish()
    }
}

impl Endpoint for ListView {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn section_permissions(&self) -> &[Arc<dyn Permission>] {
        &self.permissions.section
    }

    fn execute(&self, ctx: &mut PipelineContext) -> ApiResult<Value> {
        let model = declared_model(&self.meta)?;
        let queryset = self.build_queryset(ctx, model)?;

        let Some(paginator) = PaginatorRef::declared(&self.meta) else {
            return self.build_response(&ListPage {
                queryset: &queryset,
                page: &queryset,
                pagination: None,
            });
        };

        let mut pagination = Pagination::new(paginator);
        pagination.validate_query(&ctx.query_data())?;
        let page = pagination.paginate(&queryset)?;
        self.build_response(&ListPage {
            queryset: &queryset,
            page: &page,
            pagination: Some(&pagination),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::pagination::{FromIdPaginator, LimitOffsetPaginator};
    use crate::views::fixtures;
    use hermes_core::HttpError;
    use hermes_extract::ApiRequest;
    use hermes_schema::{Condition, Schema, SchemaField};
    use indexmap::IndexMap;
    use http::{Method, StatusCode};
    use serde_json::{json, Value as Json};

    fn body(response: &http::Response<bytes::Bytes>) -> Json {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn serializer() -> Schema {
        Schema::new("SomeSerializer")
            .with_field("id", SchemaField::int())
            .with_field("i", SchemaField::int())
    }

    #[test]
    fn test_list_without_paginator() {
        let store = fixtures::store();
        fixtures::insert(&store, 10, "a");
        fixtures::insert(&store, 20, "b");
        let view = ListView::define(
            "ListSome",
            MetaLayer::new()
                .tags(["some"])
                .set("model", store.model())
                .set("serializer", serializer()),
        )
        .unwrap();

        let response = Dispatcher::default()
            .dispatch(&view, ApiRequest::new(Method::GET, "/some/list"))
            .unwrap();
        assert_eq!(
            body(&response),
            json!({"status": "ok", "data": [{"id": 1, "i": 10}, {"id": 2, "i": 20}]})
        );
    }

    #[test]
    fn test_from_id_pagination() {
        let store = fixtures::store();
        fixtures::insert(&store, 1, "a");
        fixtures::insert(&store, 2, "b");
        fixtures::insert(&store, 3, "c");
        let view = ListView::define(
            "ListSome",
            MetaLayer::new()
                .tags(["some"])
                .set("model", store.model())
                .set("serializer", serializer())
                .set("paginator", FromIdPaginator::asc()),
        )
        .unwrap();
        let dispatcher = Dispatcher::default();

        let response = dispatcher
            .dispatch(&view, ApiRequest::new(Method::GET, "/some/list").query_param("from_id", "2"))
            .unwrap();
        assert_eq!(body(&response)["data"], json!([{"id": 3, "i": 3}]));

        let response = dispatcher
            .dispatch(&view, ApiRequest::new(Method::GET, "/some/list").query_param("limit", "101"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body(&response)["field_problems"],
            json!({"limit": ["Ensure this value is less than or equal to 100."]})
        );
    }

    #[test]
    fn test_custom_queryset_and_response() {
        let store = fixtures::store();
        for i in 1..=5 {
            fixtures::insert(&store, i, "x");
        }
        let view = ListView::define(
            "ListSome",
            MetaLayer::new()
                .tags(["some"])
                .set("model", store.model())
                .set("paginator", LimitOffsetPaginator::new())
                .serializer_many(false),
        )
        .unwrap()
        .queryset(|_ctx, model| Ok(model.objects().filter(Condition::gt("i", 1)).order_by("-id")))
        .response(|page| {
            let pagination = page.pagination.ok_or_else(HttpError::internal)?;
            let info = pagination.page_info(page.queryset)?.ok_or_else(HttpError::internal)?;
            let mut out = IndexMap::new();
            out.insert("count".to_string(), Value::from(i64::try_from(info.total_count).unwrap_or_default()));
            out.insert("page".to_string(), Value::from(info.current_page));
            out.insert("list".to_string(), rows_value(page.page.fetch()?));
            Ok(Value::from(out))
        });

        let response = Dispatcher::default()
            .dispatch(
                &view,
                ApiRequest::new(Method::GET, "/some/list")
                    .query_param("limit", "2")
                    .query_param("offset", "2"),
            )
            .unwrap();
        let data = &body(&response)["data"];
        assert_eq!(data["count"], 4);
        assert_eq!(data["page"], 2);
        let ids: Vec<i64> = data["list"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, [3, 2]);
    }
}
