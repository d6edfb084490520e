use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::domain::audio::Voice;
use crate::domain::story::LengthBand;

/// Environment variables holding the upstream API key pool, in lookup order
const API_KEY_VARS: &[&str] = &[
    "OPENAI_API_KEY_1",
    "OPENAI_API_KEY_2",
    "OPENAI_API_KEY_3",
    "OPENAI_API_KEY_4",
    "OPENAI_API_KEY_5",
    "OPENAI_API_KEY",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Upstream (OpenAI-compatible) services
    pub openai_api_keys: Vec<String>,
    pub openai_base_url: String,
    pub chat_model: String,
    pub tts_model: String,
    pub default_voice: Voice,
    pub story_length: LengthBand,
    pub upstream: UpstreamPolicy,
}

/// Timeout and retry policy applied to every upstream call
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamPolicy {
    pub timeout: Duration,
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_delay: Duration,
}

impl Default for UpstreamPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 0,
            initial_backoff_ms: 500,
            max_delay: Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let defaults = UpstreamPolicy::default();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            openai_api_keys: collect_api_keys(|name| env::var(name).ok()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            tts_model: env::var("TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            default_voice: env::var("DEFAULT_VOICE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            story_length: match env::var("STORY_LENGTH").as_deref() {
                Ok("short") => LengthBand::Short,
                _ => LengthBand::Long,
            },
            upstream: UpstreamPolicy {
                timeout: Duration::from_secs(
                    env::var("UPSTREAM_TIMEOUT_SECS")
                        .unwrap_or_else(|_| defaults.timeout.as_secs().to_string())
                        .parse()?,
                ),
                max_retries: env::var("UPSTREAM_MAX_RETRIES")
                    .unwrap_or_else(|_| defaults.max_retries.to_string())
                    .parse()?,
                initial_backoff_ms: env::var("UPSTREAM_RETRY_BACKOFF_MS")
                    .unwrap_or_else(|_| defaults.initial_backoff_ms.to_string())
                    .parse()?,
                max_delay: Duration::from_secs(
                    env::var("UPSTREAM_RETRY_MAX_DELAY_SECS")
                        .unwrap_or_else(|_| defaults.max_delay.as_secs().to_string())
                        .parse()?,
                ),
            },
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Gather the non-empty API keys from the pool variables
fn collect_api_keys<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect()
}
