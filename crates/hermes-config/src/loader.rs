//! Layered settings loader.
//!
//! This module provides the [`SettingsLoader`] for loading settings from
//! defaults, files, `.env` files and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::Settings;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "HERMES";

/// Settings loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values, or a preset
/// 2. Settings file (TOML or JSON) or string
/// 3. `.env` file, loaded into the process environment
/// 4. Environment variables `HERMES__SECTION__KEY`
///
/// A file or string replaces the whole settings value. Sections and keys it
/// leaves out fall back to their defaults, not to the previous layer.
///
/// # Example
///
/// ```no_run
/// use hermes_config::SettingsLoader;
///
/// # fn main() -> Result<(), hermes_config::ConfigError> {
/// let settings = SettingsLoader::new()
///     .with_optional_file("hermes.toml")?
///     .with_dotenv()?
///     .with_env()
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SettingsLoader {
    settings: Settings,
    env_prefix: Option<String>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Create a loader starting from default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            env_prefix: None,
        }
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use hermes_config::SettingsLoader;
    ///
    /// let settings = SettingsLoader::new().with_development().load().unwrap();
    /// assert!(settings.debug);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.settings = Settings::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.settings = Settings::production();
        self
    }

    /// Load settings from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON or unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        self.settings = parse(&content, format)?;

        Ok(self)
    }

    /// Load settings from a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load settings from a string in the given format (`toml` or `json`).
    ///
    /// ```
    /// use hermes_config::SettingsLoader;
    ///
    /// let settings = SettingsLoader::new()
    ///     .with_string("[docs]\nproject_name = \"notes\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(settings.docs.project_name, "notes");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> ConfigResult<Self> {
        self.settings = parse(content, format)?;
        Ok(self)
    }

    /// Load `.env` from the working directory, if present.
    ///
    /// Variables already set in the environment are not overwritten.
    pub fn with_dotenv(self) -> ConfigResult<Self> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(err) if err.not_found() => Ok(self),
            Err(err) => Err(ConfigError::env_parse_error(".env", err.to_string())),
        }
    }

    /// Load a specific `.env` file.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        dotenvy::from_path(path)
            .map_err(|err| ConfigError::env_parse_error(path.display().to_string(), err.to_string()))?;
        Ok(self)
    }

    /// Apply `HERMES__*` environment overrides on [`load`](Self::load).
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_prefix(ENV_PREFIX)
    }

    /// Apply overrides with a custom prefix on [`load`](Self::load).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or the final
    /// settings are invalid.
    pub fn load(mut self) -> ConfigResult<Settings> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix, env::vars())?;
        }
        self.settings.validate()?;
        Ok(self.settings)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> Settings {
        self.settings
    }

    fn apply_env_overrides<I>(&mut self, prefix: &str, vars: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if key.starts_with(prefix) {
                self.apply_env_var(&key, &value, prefix)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> ConfigResult<()> {
        let Some(path) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };
        let parts: Vec<&str> = path.split("__").collect();

        match parts.as_slice() {
            ["DEBUG"] => {
                self.settings.debug =
                    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            ["PIPELINE", "PARSER"] => self.settings.pipeline.parser = value.to_lowercase(),
            ["PIPELINE", "RENDERER"] => self.settings.pipeline.renderer = value.to_lowercase(),

            ["DOCS", "PROJECT_NAME"] => self.settings.docs.project_name = value.to_string(),
            ["DOCS", "PROJECT_VERSION"] => self.settings.docs.project_version = value.to_string(),
            ["DOCS", "OPENAPI_VERSION"] => self.settings.docs.openapi_version = value.to_string(),

            ["LOGGING", "LEVEL"] => self.settings.logging.level = value.to_lowercase(),
            ["LOGGING", "JSON_FORMAT"] => {
                self.settings.logging.json_format =
                    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Unknown keys are ignored.
            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> ConfigResult<Settings> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        _ => Err(ConfigError::UnsupportedFormat(format.to_string())),
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
