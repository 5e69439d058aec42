//! Configuration section types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default body parser and renderer of the request pipeline.
///
/// # Example
///
/// ```
/// use hermes_config::PipelineSettings;
///
/// let pipeline = PipelineSettings::default();
/// assert_eq!(pipeline.parser, "json");
/// assert_eq!(pipeline.renderer, "json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PipelineSettings {
    /// Name of the body parser.
    #[serde(default = "default_codec")]
    pub parser: String,

    /// Name of the response renderer.
    #[serde(default = "default_codec")]
    pub renderer: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            parser: default_codec(),
            renderer: default_codec(),
        }
    }
}

/// Header of the generated API document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocsSettings {
    /// Document title.
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// API version.
    #[serde(default = "default_project_version")]
    pub project_version: String,

    /// OpenAPI version.
    #[serde(default = "default_openapi_version")]
    pub openapi_version: String,
}

impl Default for DocsSettings {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            project_version: default_project_version(),
            openapi_version: default_openapi_version(),
        }
    }
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Level (`trace`, `debug`, `info`, `warn`, `error` or `off`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

/// Extensions of the built-in field kind tables.
///
/// Keys are storage or form field kind names, values are serializer field
/// kind names such as `Int` or `List<Str>`.
///
/// ```toml
/// [mappings.serializer_field_mapping]
/// JSONField = "Dict"
///
/// [mappings.form_field_mapping]
/// SplitDateTimeField = "DateTime"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MappingSettings {
    /// Storage kind name to serializer kind name.
    #[serde(default)]
    pub serializer_field_mapping: IndexMap<String, String>,

    /// Form field kind name to serializer kind name.
    #[serde(default)]
    pub form_field_mapping: IndexMap<String, String>,
}

/// Log levels accepted by [`LoggingSettings::level`].
pub const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

fn default_codec() -> String {
    "json".to_string()
}

fn default_project_name() -> String {
    "default".to_string()
}

fn default_project_version() -> String {
    "1.0.0".to_string()
}

fn default_openapi_version() -> String {
    "3.0.2".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_defaults() {
        let docs = DocsSettings::default();
        assert_eq!(docs.project_name, "default");
        assert_eq!(docs.project_version, "1.0.0");
        assert_eq!(docs.openapi_version, "3.0.2");

        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert!(!logging.json_format);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let docs: DocsSettings = toml::from_str(r#"project_name = "notes""#).unwrap();
        assert_eq!(docs.project_name, "notes");
        assert_eq!(docs.openapi_version, "3.0.2");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = toml::from_str::<PipelineSettings>(r#"parsers = "json""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_mapping_order_is_kept() {
        let mappings: MappingSettings = toml::from_str(
            r#"
            [serializer_field_mapping]
            JSONField = "Dict"
            ArrayField = "List<Str>"
            "#,
        )
        .unwrap();
        let keys: Vec<&str> = mappings.serializer_field_mapping.keys().map(String::as_str).collect();
        assert_eq!(keys, ["JSONField", "ArrayField"]);
    }
}
