//! Client configuration and factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gnosis_core::evaluator::{Evaluator, EvaluatorConfig};

use crate::http::{HttpGenerationClient, DEFAULT_TIMEOUT_SECS};

/// Production generation API.
pub const DEFAULT_API_BASE: &str = "https://gnosis-gen-production.up.railway.app";

/// Environment variable overriding `api_base`.
pub const API_BASE_ENV: &str = "GNOSIS_API_BASE";

/// Top-level gnosis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GnosisConfig {
    /// Base URL of the generation API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Answer evaluation settings.
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for GnosisConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_timeout(),
            evaluator: EvaluatorConfig::default(),
        }
    }
}

impl GnosisConfig {
    /// Build an HTTP client for the configured API.
    pub fn create_client(&self) -> Result<HttpGenerationClient> {
        HttpGenerationClient::new(&self.api_base, self.timeout_secs)
    }

    /// Build an evaluator from the `[evaluator]` settings.
    pub fn create_evaluator(&self) -> Evaluator {
        Evaluator::new(self.evaluator.clone())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut pos = 0;
    while let Some(offset) = result[pos..].find("${") {
        let start = pos + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!(
            "{}{}{}",
            &result[..start],
            value,
            &result[start + end + 1..]
        );
        pos = start + value.len();
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gnosis.toml` in the current directory
/// 2. `~/.config/gnosis/config.toml`
///
/// `GNOSIS_API_BASE` overrides the configured API base URL.
pub fn load_config() -> Result<GnosisConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GnosisConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gnosis.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => GnosisConfig::default(),
    };

    if let Ok(base) = std::env::var(API_BASE_ENV) {
        if !base.trim().is_empty() {
            config.api_base = base;
        }
    }
    config.api_base = resolve_env_vars(&config.api_base);

    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config_str(content: &str) -> Result<GnosisConfig> {
    Ok(toml::from_str::<GnosisConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gnosis"))
}
