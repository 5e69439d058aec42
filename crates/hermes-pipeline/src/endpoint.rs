//! The endpoint contract.

use std::fmt;
use std::sync::Arc;

use hermes_authz::{LoginRequired, Permission};
use hermes_core::{ApiResult, IncorrectMeta, Meta, MetaLayer, MetaSchema};
use hermes_schema::Value;

use crate::context::PipelineContext;

/// One endpoint: validated metadata plus business logic.
///
/// The dispatcher handles everything around [`Endpoint::execute`]: method
/// check, section permissions, query and body validation, serialization and
/// rendering. `execute` reads the validated input from the context and
/// returns the value the serializer dumps.
pub trait Endpoint: Send + Sync {
    /// The endpoint's metadata.
    fn meta(&self) -> &Meta;

    /// Permissions checked before any input is validated.
    fn section_permissions(&self) -> &[Arc<dyn Permission>] {
        &[]
    }

    /// Business logic.
    fn execute(&self, ctx: &mut PipelineContext) -> ApiResult<Value>;
}

impl fmt::Debug for dyn Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("class_name", &self.meta().class_name())
            .field("method", &self.meta().method())
            .finish()
    }
}

type Handler = Arc<dyn Fn(&mut PipelineContext) -> ApiResult<Value> + Send + Sync>;

/// An endpoint whose business logic is a closure.
///
/// # Example
///
/// ```rust
/// use hermes_core::{HttpMethod, MetaLayer};
/// use hermes_pipeline::{ApiView, Endpoint};
/// use hermes_schema::Value;
///
/// let view = ApiView::define(
///     "Ping",
///     MetaLayer::new().method(HttpMethod::Get).tags(["health"]),
///     |_ctx| Ok(Value::from("pong")),
/// )
/// .unwrap()
/// .login_required();
///
/// assert_eq!(view.meta().class_name(), "Ping");
/// assert_eq!(view.section_permissions().len(), 1);
/// ```
#[derive(Clone)]
pub struct ApiView {
    meta: Meta,
    permissions: Vec<Arc<dyn Permission>>,
    handler: Handler,
}

impl ApiView {
    /// Validates `layer` against the base metadata rules.
    pub fn define<F>(class_name: &str, layer: MetaLayer, handler: F) -> Result<Self, IncorrectMeta>
    where
        F: Fn(&mut PipelineContext) -> ApiResult<Value> + Send + Sync + 'static,
    {
        Self::define_with_schema(class_name, layer, &MetaSchema::base(), handler)
    }

    /// Validates `layer` against a custom rule set.
    pub fn define_with_schema<F>(
        class_name: &str,
        layer: MetaLayer,
        schema: &MetaSchema,
        handler: F,
    ) -> Result<Self, IncorrectMeta>
    where
        F: Fn(&mut PipelineContext) -> ApiResult<Value> + Send + Sync + 'static,
    {
        let meta = Meta::define(class_name, None, layer, schema)?;
        Ok(Self::from_meta(meta, handler))
    }

    /// Wraps already validated metadata.
    #[must_use]
    pub fn from_meta<F>(meta: Meta, handler: F) -> Self
    where
        F: Fn(&mut PipelineContext) -> ApiResult<Value> + Send + Sync + 'static,
    {
        Self {
            meta,
            permissions: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Adds a section permission.
    #[must_use]
    pub fn section_permission(mut self, permission: impl Permission + 'static) -> Self {
        self.permissions.push(Arc::new(permission));
        self
    }

    /// Requires an authenticated caller.
    #[must_use]
    pub fn login_required(self) -> Self {
        self.section_permission(LoginRequired)
    }
}

impl fmt::Debug for ApiView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiView")
            .field("meta", &self.meta)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}

impl Endpoint for ApiView {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn section_permissions(&self) -> &[Arc<dyn Permission>] {
        &self.permissions
    }

    fn execute(&self, ctx: &mut PipelineContext) -> ApiResult<Value> {
        (self.handler)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::HttpMethod;

    #[test]
    fn test_define_reports_contract_violations() {
        let err = ApiView::define("Broken", MetaLayer::new().tags(Vec::<String>::new()), |_| {
            Ok(Value::Null)
        })
        .unwrap_err();
        assert_eq!(err.class_name(), "Broken");
        assert!(err.errors().iter().any(|e| e.contains("tags")));
    }

    #[test]
    fn test_debug_output_names_the_endpoint() {
        let view: Arc<dyn Endpoint> = Arc::new(
            ApiView::define(
                "Echo",
                MetaLayer::new().method(HttpMethod::Post).tags(["echo"]),
                |_| Ok(Value::Null),
            )
            .unwrap(),
        );
        let debug = format!("{view:?}");
        assert!(debug.contains("Echo"));
    }
}
