//! Generic model views.
//!
//! Each view carries an abstract base layer ([`GetView::base_layer`] and
//! friends) that the concrete layer is merged over, and its own rule set
//! ([`GetView::meta_schema`]) the merged metadata is validated against.
//!
//! | View | Method | Input | Result |
//! |------|--------|-------|--------|
//! | [`CreateView`] | POST | `model_form` body | the new row |
//! | [`GetView`] | GET | `query_form {id}` | the row |
//! | [`UpdateView`] | POST | `body_form {id}` + `model_form` body | the updated row |
//! | [`DeleteView`] | POST | `body_form {id}` | `{}` |
//! | [`ListView`] | GET | optional paginator parameters | rows, via a response builder |

mod create;
mod delete;
mod get;
mod list;
mod update;

pub use create::CreateView;
pub use delete::DeleteView;
pub use get::GetView;
pub use list::{ListPage, ListView};
pub use update::UpdateView;

use std::sync::Arc;

use hermes_authz::{check_permissions, Permission, PermissionContext};
use hermes_core::{
    ApiError, ApiResult, Expected, HttpError, IncorrectMeta, Meta, MetaLayer, MetaRule, MetaSchema,
    ValueType,
    KIND_FORM, KIND_MODEL,
};
use hermes_schema::{MetaExt, Model, ModelForm, Row, Value};

use crate::context::PipelineContext;
use crate::error::PipelineError;

/// Lookup key used when `object_key` is not declared.
pub const DEFAULT_OBJECT_KEY: &str = "id";

/// Permission lists of one view.
#[derive(Debug, Clone, Default)]
struct Permissions {
    section: Vec<Arc<dyn Permission>>,
    object: Vec<Arc<dyn Permission>>,
}

fn model_schema() -> MetaSchema {
    MetaSchema::base().rule("model", MetaRule::required(Expected::SubclassOf(KIND_MODEL)))
}

fn object_schema() -> MetaSchema {
    model_schema().rule("object_key", MetaRule::optional(Expected::Type(ValueType::Str)))
}

fn with_model_form(schema: MetaSchema) -> MetaSchema {
    schema.rule("model_form", MetaRule::required(Expected::SubclassOf(KIND_FORM)))
}

/// Validates merged metadata. A required `model_form` must also be a model
/// form rather than a plain form.
fn define_meta(
    class_name: &str,
    base: Option<&Meta>,
    layer: MetaLayer,
    schema: &MetaSchema,
    needs_model_form: bool,
) -> Result<Meta, IncorrectMeta> {
    let meta = Meta::define(class_name, base, layer, schema)?;
    if needs_model_form && meta.model_form("model_form").is_none() {
        return Err(IncorrectMeta::new(
            class_name,
            vec!["`model_form` has incorrect type, should be subclass of `ModelForm`".to_string()],
        ));
    }
    Ok(meta)
}

fn missing(meta: &Meta, capability: &'static str) -> ApiError {
    ApiError::fault(PipelineError::MissingCapability {
        view: meta.class_name().to_string(),
        capability,
    })
}

fn declared_model(meta: &Meta) -> ApiResult<&Model> {
    meta.model().ok_or_else(|| missing(meta, "model"))
}

fn declared_model_form(meta: &Meta) -> ApiResult<&ModelForm> {
    meta.model_form("model_form").ok_or_else(|| missing(meta, "model_form"))
}

fn object_key(meta: &Meta) -> &str {
    meta.get_str("object_key").unwrap_or(DEFAULT_OBJECT_KEY)
}

/// Finds the row named by `key_value` and checks object permissions on it.
fn load_object(
    meta: &Meta,
    permissions: &[Arc<dyn Permission>],
    ctx: &PipelineContext,
    key_value: Option<&Value>,
) -> ApiResult<Row> {
    let model = declared_model(meta)?;
    let key_value = key_value
        .filter(|v| !v.is_null())
        .ok_or_else(HttpError::not_found)?;
    let row = model
        .objects()
        .get(object_key(meta), key_value)?
        .ok_or_else(HttpError::not_found)?;

    let object = row.clone().into_value();
    let permission_ctx = PermissionContext::new(ctx.identity(), ctx.path()).with_object(&object);
    check_permissions(permissions, &permission_ctx)?;
    Ok(row)
}

/// Wraps rows as a list value.
#[must_use]
pub fn rows_value(rows: Vec<Row>) -> Value {
    Value::List(rows.into_iter().map(Row::into_value).collect())
}

/// Builder methods shared by every generic view.
macro_rules! view_builders {
    ($view:ident) => {
        impl $view {
            /// Validated metadata.
            #[must_use]
            pub const fn meta(&self) -> &hermes_core::Meta {
                &self.meta
            }

            /// Defines a view extending this one: `layer` is merged over this
            /// view's metadata.
            pub fn extend(
                &self,
                class_name: &str,
                layer: hermes_core::MetaLayer,
            ) -> Result<Self, hermes_core::IncorrectMeta> {
                let mut view = self.clone();
                view.meta = $crate::views::define_meta(
                    class_name,
                    Some(&self.meta),
                    layer,
                    &Self::meta_schema(),
                    Self::NEEDS_MODEL_FORM,
                )?;
                Ok(view)
            }

            /// Adds a permission checked before input validation.
            #[must_use]
            pub fn section_permission(mut self, permission: impl hermes_authz::Permission + 'static) -> Self {
                self.permissions.section.push(std::sync::Arc::new(permission));
                self
            }

            /// Requires an authenticated caller.
            #[must_use]
            pub fn login_required(self) -> Self {
                self.section_permission(hermes_authz::LoginRequired)
            }
        }
    };
    ($view:ident, object) => {
        view_builders!($view);

        impl $view {
            /// Adds a permission checked against the looked-up row.
            #[must_use]
            pub fn object_permission(mut self, permission: impl hermes_authz::Permission + 'static) -> Self {
                self.permissions.object.push(std::sync::Arc::new(permission));
                self
            }
        }
    };
}

pub(crate) use view_builders;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use hermes_authz::FnPermission;
    use hermes_schema::{FixedClock, MemoryStore, ModelDescriptor, ModelField, StorageKind};
    use indexmap::IndexMap;

    use super::*;

    pub fn store() -> MemoryStore {
        MemoryStore::with_clock(
            ModelDescriptor::new("SomeModel")
                .field(ModelField::new("id", StorageKind::Auto))
                .field(ModelField::new("i", StorageKind::Integer))
                .field(ModelField::new("f", StorageKind::Float))
                .field(ModelField::new("nullable", StorageKind::Char).null().max_length(64))
                .field(ModelField::new("created", StorageKind::DateTime).auto_now_add()),
            FixedClock(Utc.with_ymd_and_hms(2020, 2, 28, 16, 0, 0).unwrap()),
        )
    }

    pub fn insert(store: &MemoryStore, i: i64, nullable: &str) -> Row {
        let mut values = IndexMap::new();
        values.insert("i".to_string(), Value::from(i));
        values.insert("f".to_string(), Value::from(1.5));
        values.insert("nullable".to_string(), Value::from(nullable));
        store.model().source().insert(values).unwrap()
    }

    pub fn hide_restricted() -> FnPermission {
        FnPermission::new("HideRestricted", |ctx| {
            ctx.object_attribute("nullable")
                .map_or(true, |v| v.as_str() != Some("without_permissions"))
        })
    }
}
