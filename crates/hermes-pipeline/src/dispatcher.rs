//! Fixed-order request dispatcher.
//!
//! Every request runs the same stages in the same order:
//!
//! ```text
//! MethodCheck → SectionPermissionCheck → QueryValidate → BodyValidate
//!     → Execute → Serialize → Envelope → Render
//! ```
//!
//! Any stage may short-circuit with an [`HttpError`], which is rendered with
//! its declared status code. Anything else escaping a stage (an
//! [`ApiError::Fault`] or a panic) is an internal fault: logged and rendered
//! as a 500, or handed back to the caller untouched in debug mode.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use http::StatusCode;
use serde_json::Value as Json;
use tracing::{debug, error, warn};

use hermes_authz::{check_permissions, PermissionContext};
use hermes_core::{ApiError, ApiResult, HttpError};
use hermes_extract::{parser_by_name, ApiRequest, JsonParser, Parser};
use hermes_schema::MetaExt;

use crate::context::PipelineContext;
use crate::endpoint::Endpoint;
use crate::error::PipelineError;
use crate::render::{renderer_by_name, success_envelope, JsonRenderer, Renderer, Response};
use crate::stage::Stage;

/// Dispatcher settings.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Debug mode: internal faults propagate instead of rendering a 500.
    pub debug: bool,
    /// Body parser.
    pub parser: Arc<dyn Parser>,
    /// Response renderer.
    pub renderer: Arc<dyn Renderer>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            debug: false,
            parser: Arc::new(JsonParser),
            renderer: Arc::new(JsonRenderer),
        }
    }
}

impl DispatcherConfig {
    /// Resolves parser and renderer by their settings names.
    pub fn from_names(debug: bool, parser: &str, renderer: &str) -> Result<Self, PipelineError> {
        let parser = parser_by_name(parser).ok_or_else(|| PipelineError::UnknownParser(parser.to_string()))?;
        let renderer =
            renderer_by_name(renderer).ok_or_else(|| PipelineError::UnknownRenderer(renderer.to_string()))?;
        Ok(Self {
            debug,
            parser: Arc::from(parser),
            renderer: Arc::from(renderer),
        })
    }

    /// Sets debug mode.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Runs endpoints through the pipeline.
///
/// # Example
///
/// ```rust
/// use hermes_core::{HttpMethod, MetaLayer};
/// use hermes_extract::ApiRequest;
/// use hermes_pipeline::{ApiView, Dispatcher, DispatcherConfig};
/// use hermes_schema::Value;
/// use http::{Method, StatusCode};
///
/// let view = ApiView::define(
///     "Ping",
///     MetaLayer::new().method(HttpMethod::Get).tags(["health"]),
///     |_ctx| Ok(Value::from("pong")),
/// )
/// .unwrap();
///
/// let dispatcher = Dispatcher::new(DispatcherConfig::default());
///
/// let response = dispatcher.dispatch(&view, ApiRequest::new(Method::GET, "/ping")).unwrap();
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body().as_ref(), br#"{"status":"ok","data":"pong"}"#);
///
/// let response = dispatcher.dispatch(&view, ApiRequest::new(Method::POST, "/ping")).unwrap();
/// assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// Dispatcher settings.
    #[must_use]
    pub const fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Returns true in debug mode.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.config.debug
    }

    /// Creates the context a request runs in.
    #[must_use]
    pub fn context(&self, request: ApiRequest) -> PipelineContext {
        PipelineContext::new(request, Arc::clone(&self.config.parser))
    }

    /// Runs `endpoint` on `request`.
    ///
    /// Returns `Err` only in debug mode, for internal faults. Panics inside
    /// the pipeline resume unwinding in debug mode.
    pub fn dispatch(&self, endpoint: &dyn Endpoint, request: ApiRequest) -> anyhow::Result<Response> {
        let mut ctx = self.context(request);
        self.dispatch_context(endpoint, &mut ctx)
    }

    /// Runs `endpoint` within an existing context.
    pub fn dispatch_context(
        &self,
        endpoint: &dyn Endpoint,
        ctx: &mut PipelineContext,
    ) -> anyhow::Result<Response> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(endpoint, ctx)));

        match outcome {
            Ok(Ok(payload)) => {
                debug!(stage = %Stage::Render, path = ctx.path(), request_id = %ctx.request_id(), "pipeline stage");
                Ok(self.config.renderer.render(StatusCode::OK, &payload))
            }
            Ok(Err(ApiError::Http(err))) => {
                warn!(
                    path = ctx.path(),
                    request_id = %ctx.request_id(),
                    status = err.http_code(),
                    error = err.alias(),
                    "request rejected"
                );
                Ok(self.render_error(&err))
            }
            Ok(Err(ApiError::Fault(fault))) => {
                if self.config.debug {
                    return Err(fault);
                }
                error!(
                    path = ctx.path(),
                    request_id = %ctx.request_id(),
                    error = %format!("{fault:#}"),
                    "Unhandled exception on {}",
                    ctx.path()
                );
                Ok(self.render_error(&HttpError::internal()))
            }
            Err(payload) => {
                if self.config.debug {
                    panic::resume_unwind(payload);
                }
                error!(
                    path = ctx.path(),
                    request_id = %ctx.request_id(),
                    error = panic_message(payload.as_ref()),
                    "Unhandled exception on {}",
                    ctx.path()
                );
                Ok(self.render_error(&HttpError::internal()))
            }
        }
    }

    /// Renders an error envelope.
    #[must_use]
    pub fn render_error(&self, error: &HttpError) -> Response {
        self.config.renderer.render_error(error)
    }
}

fn enter(stage: Stage, ctx: &PipelineContext) {
    debug!(stage = %stage, path = ctx.path(), request_id = %ctx.request_id(), "pipeline stage");
}

fn run(endpoint: &dyn Endpoint, ctx: &mut PipelineContext) -> ApiResult<Json> {
    let meta = endpoint.meta();

    enter(Stage::MethodCheck, ctx);
    if !meta.method().matches(ctx.request().method()) {
        return Err(HttpError::not_implemented().into());
    }

    enter(Stage::SectionPermissionCheck, ctx);
    let permission_ctx = PermissionContext::new(ctx.identity(), ctx.path());
    check_permissions(endpoint.section_permissions(), &permission_ctx)?;

    enter(Stage::QueryValidate, ctx);
    if let Some(form) = meta.form("query_form") {
        let cleaned = form.validate(&ctx.query_data()).map_err(HttpError::form)?;
        ctx.set_request_query(cleaned);
    }

    enter(Stage::BodyValidate, ctx);
    if let Some(form) = meta.form("body_form") {
        let body = ctx.body_data()?;
        let cleaned = form.validate(&body).map_err(HttpError::form)?;
        ctx.set_request_body(cleaned);
    }

    enter(Stage::Execute, ctx);
    let result = endpoint.execute(ctx)?;

    enter(Stage::Serialize, ctx);
    let data = match meta.serializer() {
        Some(schema) => schema.dump_value(&result, meta.serializer_many())?,
        None => result.to_json(),
    };

    enter(Stage::Envelope, ctx);
    Ok(success_envelope(data))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{CallerIdentity, HttpMethod, MetaLayer};
    use hermes_schema::{Form, FormField, Schema, SchemaField, Value};
    use http::Method;
    use indexmap::IndexMap;
    use serde_json::json;

    use crate::endpoint::ApiView;

    fn body(response: &Response) -> Json {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn echo_view() -> ApiView {
        let layer = MetaLayer::new()
            .method(HttpMethod::Post)
            .tags(["echo"])
            .set("query_form", Form::new("EchoQuery").with_field("n", FormField::integer().optional()))
            .set("body_form", Form::new("EchoBody").with_field("i", FormField::integer()))
            .set("serializer", Schema::new("Echo").with_field("i", SchemaField::int()).with_field("n", SchemaField::int().optional()));
        ApiView::define("Echo", layer, |ctx| {
            let mut out = IndexMap::new();
            let i = ctx.request_body().and_then(|b| b.get_i64("i"));
            out.insert("i".to_string(), Value::from(i));
            let n = ctx.request_query().and_then(|q| q.get_i64("n"));
            out.insert("n".to_string(), Value::from(n));
            Ok(Value::from(out))
        })
        .unwrap()
    }

    #[test]
    fn test_full_pipeline() {
        let response = Dispatcher::default()
            .dispatch(
                &echo_view(),
                ApiRequest::new(Method::POST, "/echo")
                    .query_param("n", "7")
                    .json(&json!({"i": 3, "extra": true})),
            )
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response), json!({"status": "ok", "data": {"i": 3, "n": 7}}));
    }

    #[test]
    fn test_method_mismatch() {
        let response = Dispatcher::default()
            .dispatch(&echo_view(), ApiRequest::new(Method::GET, "/echo"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body(&response)["status"], "not_implemented");
    }

    #[test]
    fn test_query_form_errors() {
        let response = Dispatcher::default()
            .dispatch(
                &echo_view(),
                ApiRequest::new(Method::POST, "/echo")
                    .query_param("n", "x")
                    .json(&json!({"i": 1})),
            )
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body(&response),
            json!({
                "status": "bad_request",
                "message": "Bad request",
                "data": {},
                "field_problems": {"n": ["Enter a whole number."]}
            })
        );
    }

    #[test]
    fn test_body_validation() {
        let dispatcher = Dispatcher::default();

        let response = dispatcher
            .dispatch(&echo_view(), ApiRequest::new(Method::POST, "/echo").body("{", "application/json"))
            .unwrap();
        assert_eq!(body(&response)["message"], "body json is invalid");

        // Bodies of other media types are treated as empty input.
        let response = dispatcher
            .dispatch(&echo_view(), ApiRequest::new(Method::POST, "/echo").body("i=1", "text/plain"))
            .unwrap();
        assert_eq!(
            body(&response)["field_problems"],
            json!({"i": ["This field is required."]})
        );
    }

    #[test]
    fn test_section_permissions_run_before_validation() {
        let view = echo_view().login_required();
        let response = Dispatcher::default()
            .dispatch(&view, ApiRequest::new(Method::POST, "/echo").body("{", "application/json"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body(&response)["status"], "auth_required");

        let response = Dispatcher::default()
            .dispatch(
                &view,
                ApiRequest::new(Method::POST, "/echo")
                    .identity(CallerIdentity::user("u-1"))
                    .json(&json!({"i": 1})),
            )
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_domain_errors_from_execute() {
        let view = ApiView::define(
            "Missing",
            MetaLayer::new().method(HttpMethod::Get).tags(["t"]),
            |_| Err(HttpError::not_found().into()),
        )
        .unwrap();
        let response = Dispatcher::default()
            .dispatch(&view, ApiRequest::new(Method::GET, "/missing"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_missing_serializer_field_is_a_fault() {
        let layer = MetaLayer::new()
            .method(HttpMethod::Get)
            .tags(["t"])
            .set("serializer", Schema::new("S").with_field("id", SchemaField::int()));
        let view = ApiView::define("Broken", layer, |_| Ok(Value::from(IndexMap::new()))).unwrap();

        let response = Dispatcher::default()
            .dispatch(&view, ApiRequest::new(Method::GET, "/broken"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let debug = Dispatcher::new(DispatcherConfig::default().with_debug(true));
        assert!(debug.dispatch(&view, ApiRequest::new(Method::GET, "/broken")).is_err());
    }

    #[test]
    fn test_panics_render_internal_error() {
        let view = ApiView::define(
            "Divide",
            MetaLayer::new().method(HttpMethod::Get).tags(["t"]),
            |ctx| {
                let divisor = ctx.query_data().len();
                Ok(Value::from(i64::try_from(10 / divisor).unwrap_or_default()))
            },
        )
        .unwrap();

        let response = Dispatcher::default()
            .dispatch(&view, ApiRequest::new(Method::GET, "/divide"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body(&response),
            json!({"status": "internal_error", "message": "Internal server error", "data": {}})
        );
    }

    #[test]
    fn test_panics_resume_in_debug_mode() {
        let view = ApiView::define(
            "Boom",
            MetaLayer::new().method(HttpMethod::Get).tags(["t"]),
            |_| panic!("boom"),
        )
        .unwrap();
        let dispatcher = Dispatcher::new(DispatcherConfig::default().with_debug(true));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            dispatcher.dispatch(&view, ApiRequest::new(Method::GET, "/boom"))
        }));
        assert!(outcome.is_err());
    }

    #[test]
    fn test_config_from_names() {
        let config = DispatcherConfig::from_names(true, "json", "json").unwrap();
        assert!(config.debug);
        assert_eq!(
            DispatcherConfig::from_names(false, "xml", "json").unwrap_err(),
            PipelineError::UnknownParser("xml".into())
        );
        assert_eq!(
            DispatcherConfig::from_names(false, "json", "html").unwrap_err(),
            PipelineError::UnknownRenderer("html".into())
        );
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(3_u8);
        assert_eq!(panic_message(payload.as_ref()), "panic");
    }
}
