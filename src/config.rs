use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_PRETALX_BASE_URL: &str = "https://cfp.pycon.my/api/events/pyconmy-2024";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Clone, Debug)]
pub struct Config {
    pub pretalx_api_key: String,
    pub pretalx_base_url: String,
    pub max_pages: usize,
    pub request_timeout: Duration,
    pub gemini: GeminiConfig,
    pub title: String,
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub fallback_models: Vec<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Credentials are
    /// checked first so a missing key fails before anything else is parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pretalx_api_key = required(&lookup, "PRETALX_API")?;
        let gemini_api_key = required(&lookup, "GEMINI_API")?;

        let pretalx_base_url = lookup("PRETALX_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PRETALX_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let max_pages: usize = parsed(&lookup, "PRETALX_MAX_PAGES", 100)?;
        if max_pages == 0 {
            return Err(ConfigError::Invalid {
                key: "PRETALX_MAX_PAGES",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let request_timeout = Duration::from_secs(parsed(&lookup, "REQUEST_TIMEOUT_SECS", 30)?);

        let fallback_models = lookup("GEMINI_FALLBACK_MODELS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let gemini = GeminiConfig {
            api_key: gemini_api_key,
            base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: optional(&lookup, "GEMINI_MODEL", DEFAULT_GEMINI_MODEL)?,
            fallback_models,
            timeout: Duration::from_secs(parsed(&lookup, "GEMINI_TIMEOUT_SECS", 120)?),
            max_retries: parsed(&lookup, "GEMINI_MAX_RETRIES", 3)?,
            initial_backoff: Duration::from_secs(2),
        };

        let title = lookup("DASHBOARD_TITLE").unwrap_or_else(|| "PyCon MY 2024 Submissions".to_string());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parsed(&lookup, "PORT", 5001)?;

        Ok(Self {
            pretalx_api_key,
            pretalx_base_url,
            max_pages,
            request_timeout,
            gemini,
            title,
            host,
            port,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).ok_or(ConfigError::Missing { key })?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Empty { key });
    }
    Ok(value.to_string())
}

/// Like [`required`] but with a default when the key is absent; a key that is
/// present but blank is still rejected.
fn optional<F>(lookup: &F, key: &'static str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default.to_string()),
        Some(_) => required(lookup, key),
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
