//! Root settings type.

use serde::{Deserialize, Serialize};

use hermes_schema::{FieldMapping, FieldKind};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{DocsSettings, LoggingSettings, MappingSettings, PipelineSettings, LOG_LEVELS};

/// Complete Hermes settings.
///
/// Use [`SettingsLoader`](crate::SettingsLoader) to load settings from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use hermes_config::Settings;
///
/// let settings = Settings::default();
/// assert!(!settings.debug);
/// assert_eq!(settings.pipeline.parser, "json");
/// assert_eq!(settings.docs.openapi_version, "3.0.2");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Debug mode: internal faults propagate instead of rendering a 500.
    #[serde(default)]
    pub debug: bool,

    /// Request pipeline codecs.
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// API document header.
    #[serde(default)]
    pub docs: DocsSettings,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Field kind table extensions.
    #[serde(default)]
    pub mappings: MappingSettings,
}

impl Settings {
    /// Local development: debug mode and debug-level logs.
    ///
    /// ```
    /// use hermes_config::Settings;
    ///
    /// let settings = Settings::development();
    /// assert!(settings.debug);
    /// assert_eq!(settings.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        Self {
            debug: true,
            logging: LoggingSettings {
                level: "debug".to_string(),
                json_format: false,
            },
            ..Self::default()
        }
    }

    /// Production: faults are masked and logs are JSON lines.
    #[must_use]
    pub fn production() -> Self {
        Self {
            debug: false,
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: true,
            },
            ..Self::default()
        }
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the parser or renderer name is unknown
    /// - the log level is not one of [`LOG_LEVELS`]
    /// - the OpenAPI version is not a 3.x version
    /// - a mapping extension names an unknown field kind
    pub fn validate(&self) -> ConfigResult<()> {
        if hermes_extract::parser_by_name(&self.pipeline.parser).is_none() {
            return Err(ConfigError::invalid_value(
                "pipeline.parser",
                format!("unknown parser `{}`", self.pipeline.parser),
            ));
        }
        if hermes_pipeline::renderer_by_name(&self.pipeline.renderer).is_none() {
            return Err(ConfigError::invalid_value(
                "pipeline.renderer",
                format!("unknown renderer `{}`", self.pipeline.renderer),
            ));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        if !self.docs.openapi_version.starts_with("3.") {
            return Err(ConfigError::invalid_value(
                "docs.openapi_version",
                format!("unsupported OpenAPI version {}", self.docs.openapi_version),
            ));
        }

        let tables = [
            ("serializer_field_mapping", &self.mappings.serializer_field_mapping),
            ("form_field_mapping", &self.mappings.form_field_mapping),
        ];
        for (table, entries) in tables {
            for (name, kind) in entries {
                if FieldKind::from_name(kind).is_none() {
                    return Err(ConfigError::invalid_value(
                        format!("mappings.{table}.{name}"),
                        format!("unknown field kind `{kind}`"),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Built-in storage kind table extended by `mappings`.
    pub fn serializer_mapping(&self) -> ConfigResult<FieldMapping> {
        FieldMapping::serializer_defaults()
            .extend_from_names(&self.mappings.serializer_field_mapping)
            .map_err(|e| ConfigError::invalid_value("mappings.serializer_field_mapping", e.to_string()))
    }

    /// Built-in form kind table extended by `mappings`.
    pub fn form_mapping(&self) -> ConfigResult<FieldMapping> {
        FieldMapping::form_defaults()
            .extend_from_names(&self.mappings.form_field_mapping)
            .map_err(|e| ConfigError::invalid_value("mappings.form_field_mapping", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
        assert!(Settings::development().validate().is_ok());
        assert!(Settings::production().validate().is_ok());
    }

    #[test]
    fn test_production_preset() {
        let settings = Settings::production();
        assert!(!settings.debug);
        assert!(settings.logging.json_format);
    }

    #[test]
    fn test_validate_unknown_parser() {
        let mut settings = Settings::default();
        settings.pipeline.parser = "yaml".to_string();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "pipeline.parser"));
    }

    #[test]
    fn test_validate_unknown_renderer() {
        let mut settings = Settings::default();
        settings.pipeline.renderer = "xml".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "WARN".to_string();
        assert!(settings.validate().is_ok());
        settings.logging.level = "verbose".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_openapi_version() {
        let mut settings = Settings::default();
        settings.docs.openapi_version = "2.0".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_mapping_extensions() {
        let mut settings = Settings::default();
        settings
            .mappings
            .serializer_field_mapping
            .insert("JSONField".to_string(), "Dict".to_string());
        assert!(settings.validate().is_ok());
        let mapping = settings.serializer_mapping().unwrap();
        assert_eq!(mapping.get("JSONField").map(FieldKind::name).as_deref(), Some("Dict"));
        assert_eq!(mapping.get("AutoField").map(FieldKind::name).as_deref(), Some("Int"));

        settings
            .mappings
            .form_field_mapping
            .insert("SplitField".to_string(), "Blob".to_string());
        let err = settings.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for mappings.form_field_mapping.SplitField: unknown field kind `Blob`"
        );
        assert!(settings.form_mapping().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = toml::from_str::<Settings>("verbose = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = Settings::development();
        let text = toml::to_string(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
