//! Logging configuration.

/// Service name used when the settings do not name the project.
pub const DEFAULT_SERVICE_NAME: &str = "hermes";

/// How [`init_logging`](crate::init_logging) sets up the global subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `false` makes `init_logging` a no-op.
    pub enabled: bool,

    /// Filter directive (`info`, `hermes_pipeline=debug,warn`, ...).
    pub level: String,

    /// One JSON object per event; pretty multi-line output otherwise.
    pub json_format: bool,

    /// Log span open and close events.
    pub span_events: bool,

    /// Include file and line of the call site.
    pub file_line_info: bool,

    /// Include thread ids.
    pub thread_ids: bool,

    /// Prefix events with their module path.
    pub include_target: bool,

    /// Service name, reported when logging starts.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// JSON lines at info level, no call sites.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }

    /// [`LogConfig::production`] switched to pretty output at debug level,
    /// with call sites and span events.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            ..Self::production()
        }
    }

    /// Production defaults with the given level and format.
    ///
    /// ```
    /// use hermes_telemetry::LogConfig;
    ///
    /// let config = LogConfig::with_level("warn", false);
    /// assert_eq!(config.level, "warn");
    /// assert!(!config.json_format);
    /// ```
    #[must_use]
    pub fn with_level(level: impl Into<String>, json_format: bool) -> Self {
        Self {
            level: level.into(),
            json_format,
            ..Self::production()
        }
    }

    /// Sets the service name.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Disables logging.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::production()
        }
    }
}
