//! Layered configuration for the CLI.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `~/.config/clausula/config.toml`
//! 3. `./clausula.toml`
//! 4. The file passed with `--config`
//! 5. `CLAUSULA_*` environment variables, `__` separating sections
//!    (`CLAUSULA_API__BASE_URL` -> `api.base_url`)
//!
//! Command-line flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clausula_core::template::PLACEHOLDER_MARKER;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("configuration file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// How `preview` writes the rendered document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub marker: String,
    pub format: OutputFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            marker: PLACEHOLDER_MARKER.to_string(),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl Config {
    /// Load and validate configuration from every source.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit
            && !path.exists()
        {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        let config: Self = Self::figment(explicit).extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the provider chain without extracting.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from("clausula.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("CLAUSULA_").split("__"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.marker.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "render.marker".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        let url = self.api.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: format!("expected an http(s) URL, got `{url}`"),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("clausula").join("config.toml"))
    }
}
