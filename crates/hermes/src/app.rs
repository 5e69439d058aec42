//! Application assembly and request entry points.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use tracing::{debug, info, warn};

use hermes_config::Settings;
use hermes_core::{HttpError, Registry, RegistryBuilder};
use hermes_docs::{DocsGenerator, OpenApi};
use hermes_extract::ApiRequest;
use hermes_pipeline::{Dispatcher, DispatcherConfig, Endpoint, Response};
use hermes_telemetry::{init_logging, log_request_complete, log_request_error, log_request_start, LogConfig};

use crate::error::AppResult;

/// Collects endpoints, then freezes them into an [`App`].
///
/// # Example
///
/// ```
/// use hermes::{AppBuilder, Settings};
/// use hermes::core::{HttpMethod, MetaLayer};
/// use hermes::pipeline::ApiView;
/// use hermes::schema::Value;
/// use hermes::telemetry::LogConfig;
///
/// # fn main() -> Result<(), hermes::AppError> {
/// let ping = ApiView::define(
///     "Ping",
///     MetaLayer::new().method(HttpMethod::Get).tags(["health"]),
///     |_ctx| Ok(Value::from("pong")),
/// )?;
///
/// let app = AppBuilder::new(Settings::default())
///     .log_config(LogConfig::disabled())
///     .endpoint("/ping", ping)?
///     .build()?;
///
/// assert_eq!(app.routes().collect::<Vec<_>>(), ["/ping"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use]
pub struct AppBuilder {
    settings: Settings,
    endpoints: RegistryBuilder<Arc<dyn Endpoint>>,
    log_config: Option<LogConfig>,
}

impl AppBuilder {
    /// Starts an application with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            endpoints: RegistryBuilder::new("endpoints"),
            log_config: None,
        }
    }

    /// Mounts an endpoint at an exact path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Registry` if the path is taken.
    pub fn endpoint(self, path: impl Into<String>, endpoint: impl Endpoint + 'static) -> AppResult<Self> {
        self.shared_endpoint(path, Arc::new(endpoint))
    }

    /// Mounts an endpoint that is already shared.
    pub fn shared_endpoint(mut self, path: impl Into<String>, endpoint: Arc<dyn Endpoint>) -> AppResult<Self> {
        let path = path.into();
        debug!(path = %path, endpoint = endpoint.meta().class_name(), "registering endpoint");
        self.endpoints.register(path, endpoint)?;
        Ok(self)
    }

    /// Overrides the log setup derived from the settings.
    pub fn log_config(mut self, config: LogConfig) -> Self {
        self.log_config = Some(config);
        self
    }

    /// Validates the settings, installs logging and freezes the routes.
    ///
    /// A global subscriber installed earlier is kept.
    pub fn build(self) -> AppResult<App> {
        let settings = self.settings;
        settings.validate()?;

        let dispatcher = Dispatcher::new(DispatcherConfig::from_names(
            settings.debug,
            &settings.pipeline.parser,
            &settings.pipeline.renderer,
        )?);

        let docs = DocsGenerator::new()
            .title(settings.docs.project_name.clone())
            .version(settings.docs.project_version.clone())
            .openapi_version(settings.docs.openapi_version.clone())
            .form_mapping(settings.form_mapping()?);

        let log_config = self.log_config.unwrap_or_else(|| log_config_for(&settings));
        match init_logging(&log_config) {
            Ok(()) => {}
            Err(e) if e.is_already_initialized() => debug!("keeping the installed log subscriber"),
            Err(e) => return Err(e.into()),
        }

        let registry = self.endpoints.freeze();
        info!(endpoints = registry.len(), debug = settings.debug, "application built");

        Ok(App {
            settings,
            registry,
            dispatcher,
            docs,
        })
    }
}

fn log_config_for(settings: &Settings) -> LogConfig {
    let mut config = LogConfig::with_level(settings.logging.level.to_lowercase(), settings.logging.json_format)
        .service_name(settings.docs.project_name.clone());
    config.file_line_info = settings.debug;
    config
}

/// An assembled application: frozen routes, a dispatcher and the docs
/// generator.
///
/// `App` is `Send + Sync`; share it behind an `Arc` between server workers.
#[derive(Debug)]
pub struct App {
    settings: Settings,
    registry: Registry<Arc<dyn Endpoint>>,
    dispatcher: Dispatcher,
    docs: DocsGenerator,
}

impl App {
    /// Effective settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The request dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Mounted paths in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.registry.iter().map(|(path, _)| path)
    }

    /// The endpoint mounted at `path`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> Option<&Arc<dyn Endpoint>> {
        self.registry.get(path)
    }

    /// Routes a request by exact path and runs it through the pipeline.
    ///
    /// An unknown path renders a `not_found` envelope.
    ///
    /// # Errors
    ///
    /// Only in debug mode: an internal fault is returned instead of being
    /// rendered as a 500. Panics are resumed in debug mode.
    pub fn handle(&self, request: ApiRequest) -> anyhow::Result<Response> {
        let mut ctx = self.dispatcher.context(request);
        let request_id = ctx.request_id();
        let path = ctx.path().to_string();
        log_request_start!(request_id, ctx.request().method(), path);

        let result = match self.registry.get(&path) {
            Some(endpoint) => self.dispatcher.dispatch_context(endpoint.as_ref(), &mut ctx),
            None => {
                debug!(path = %path, "no endpoint mounted");
                Ok(self.dispatcher.render_error(&HttpError::not_found()))
            }
        };

        match &result {
            Ok(response) => {
                log_request_complete!(request_id, path, response.status().as_u16(), millis(ctx.elapsed()));
            }
            Err(fault) => log_request_error!(request_id, path, format!("{fault:#}")),
        }
        result
    }

    /// [`App::handle`] for `http` requests.
    ///
    /// A request whose query string cannot be decoded is rendered as
    /// `bad_request` without reaching an endpoint.
    pub fn handle_http(&self, request: http::Request<Bytes>) -> anyhow::Result<http::Response<Full<Bytes>>> {
        let response = match ApiRequest::from_http(request) {
            Ok(request) => self.handle(request)?,
            Err(e) => {
                warn!(error = %e, "request could not be read");
                self.dispatcher.render_error(&e.to_http_error())
            }
        };
        Ok(response.map(Full::new))
    }

    /// Generates the API document for every mounted endpoint.
    pub fn openapi(&self) -> AppResult<OpenApi> {
        let endpoints = self.registry.iter().map(|(path, endpoint)| (path, endpoint.meta()));
        Ok(self.docs.generate(endpoints)?)
    }

    /// The API document as pretty-printed JSON.
    pub fn openapi_json(&self) -> AppResult<String> {
        Ok(self.openapi()?.to_json()?)
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
