use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::pipeline::PipelineSettings;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a numeric one is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub github_token: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on provider calls in flight at once, across all requests.
    pub max_concurrent_extractions: usize,
    pub agent_batch_size: usize,
    pub agent_batch_pause_ms: u64,
    pub request_timeout_secs: u64,
    pub collection_timeout_secs: u64,
    pub portfolio_token_budget: usize,
    pub portfolio_chunk_tokens: usize,
    pub portfolio_chunk_delay_ms: u64,
    pub upload_max_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            github_token: std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_concurrent_extractions: parse_env("MAX_CONCURRENT_EXTRACTIONS", 6)?,
            agent_batch_size: parse_env("AGENT_BATCH_SIZE", 4)?,
            agent_batch_pause_ms: parse_env("AGENT_BATCH_PAUSE_MS", 1000)?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 240)?,
            collection_timeout_secs: parse_env("COLLECTION_TIMEOUT_SECS", 150)?,
            portfolio_token_budget: parse_env("PORTFOLIO_TOKEN_BUDGET", 8000)?,
            portfolio_chunk_tokens: parse_env("PORTFOLIO_CHUNK_TOKENS", 7000)?,
            portfolio_chunk_delay_ms: parse_env("PORTFOLIO_CHUNK_DELAY_MS", 500)?,
            upload_max_bytes: parse_env("UPLOAD_MAX_BYTES", 10 * 1024 * 1024)?,
        })
    }

    /// Pipeline tuning knobs, handed to `EnrichmentPipeline` at startup.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            batch_size: self.agent_batch_size.max(1),
            batch_pause: Duration::from_millis(self.agent_batch_pause_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            collection_timeout: Duration::from_secs(self.collection_timeout_secs),
            portfolio_token_budget: self.portfolio_token_budget,
            portfolio_chunk_tokens: self.portfolio_chunk_tokens.max(1),
            portfolio_chunk_delay: Duration::from_millis(self.portfolio_chunk_delay_ms),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
