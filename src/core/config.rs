//! Configuration loading and resolution.
//!
//! Optional TOML config file in the platform config directory, overridden by
//! CLI flags. The API credential comes from the environment and is checked
//! once at startup; a missing key is a startup failure, never a per-call
//! failure.

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::core::constants::{
    DEFAULT_ACCENT_COLOR, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_ORNAMENT_DENSITY, DEFAULT_TEMPERATURE,
};

/// Environment variables consulted for the API credential, in order.
const API_KEY_VARS: &[&str] = &["ARIX_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_model: Option<String>,
    pub base_url: Option<String>,
    pub accent_color: Option<String>,
    pub ornament_density: Option<u32>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "permacommons", "arix")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load the config file if present; a missing file yields defaults.
    pub fn load() -> Result<Self, Box<dyn Error>> {
        match Self::config_path() {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(&path)?;
                let config = toml::from_str(&contents)
                    .map_err(|e| format!("invalid config file {}: {e}", path.display()))?;
                Ok(config)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Fully resolved runtime settings: config file values overridden by CLI
/// flags, plus the credential from the environment.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub accent_color: String,
    pub ornament_density: u32,
    pub temperature: f64,
    pub max_tokens: u32,
    pub log_file: Option<String>,
}

impl RuntimeSettings {
    pub fn resolve(
        config: &Config,
        model_flag: Option<String>,
        base_url_flag: Option<String>,
        log_flag: Option<String>,
    ) -> Result<Self, Box<dyn Error>> {
        let api_key = lookup_api_key().ok_or(
            "❌ Error: no API key configured

Please set your API key before starting:
export ARIX_API_KEY=\"your-api-key-here\"

Optionally, you can also set a custom base URL:
export ARIX_BASE_URL=\"https://api.openai.com/v1\"",
        )?;

        let base_url = base_url_flag
            .or_else(|| env::var("ARIX_BASE_URL").ok())
            .or_else(|| config.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = model_flag
            .or_else(|| config.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            model,
            base_url,
            api_key,
            accent_color: config
                .accent_color
                .clone()
                .unwrap_or_else(|| DEFAULT_ACCENT_COLOR.to_string()),
            ornament_density: config.ornament_density.unwrap_or(DEFAULT_ORNAMENT_DENSITY),
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            log_file: log_flag,
        })
    }
}

fn lookup_api_key() -> Option<String> {
    API_KEY_VARS
        .iter()
        .find_map(|var| env::var(var).ok().filter(|key| !key.trim().is_empty()))
}
