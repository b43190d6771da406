//! Process-wide configuration
//!
//! Read once at startup and shared read-only afterwards.

use crate::error::RoiError;
use crate::Result;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub static_dir: String,
}

impl AppConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_blank("PORT").or_else(|| non_blank("API_PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                RoiError::ConfigError(format!("invalid PORT '{}': {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        let api_key = non_blank("OPENAI_API_KEY");
        if api_key.is_none() {
            warn!("OPENAI_API_KEY not set; every generation call will fail until it is configured");
        }

        Ok(Self {
            port,
            model: non_blank("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
            base_url: non_blank("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            static_dir: non_blank("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
        }
    }
}
