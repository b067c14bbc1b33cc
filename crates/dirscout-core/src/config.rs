//! Environment-driven scraper configuration.
//!
//! Every knob has a default, so a bare environment yields a working config.
//! Parsing goes through a lookup closure rather than `std::env` directly,
//! which keeps the validation logic testable with a plain `HashMap`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Fetch-policy and session knobs for one scraping session.
///
/// A session owns exactly one of these; nothing here is process-global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,
    /// Assign a random user agent to every outgoing request.
    pub user_agent_rotation: bool,
    /// Minimum interval between two fetches against the same domain.
    pub rate_limit_secs: u64,
    /// How long a cached response body stays fresh.
    pub cache_ttl_secs: u64,
    /// How long a blocklisted proxy stays unusable.
    pub blocked_proxy_timeout_secs: u64,
    /// Retry attempts after the first failure for transient errors.
    pub max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base_secs * 2^attempt`.
    pub backoff_base_secs: u64,
    /// Hard cap on pages walked per source.
    pub max_pages: usize,
    /// Consecutive empty/failed pages before a source walk stops.
    pub max_empty_pages: usize,
    /// Delay between page fetches within one source.
    pub inter_page_delay_ms: u64,
    /// Whole-session deadline; source walks stop between pages when it
    /// passes and already-collected records are kept.
    pub session_timeout_secs: u64,
    /// Route requests through the proxy pool when non-empty.
    pub proxy_enabled: bool,
    /// Candidate proxy URLs, picked at random per request.
    pub proxy_pool: Vec<String>,
    /// URLs serving plain-text proxy lists, fetched to top up the pool.
    pub proxy_source_urls: Vec<String>,
    /// Minimum interval between proxy-list refreshes.
    pub proxy_refresh_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent_rotation: true,
            rate_limit_secs: 2,
            cache_ttl_secs: 24 * 60 * 60,
            blocked_proxy_timeout_secs: 30 * 60,
            max_retries: 3,
            backoff_base_secs: 1,
            max_pages: 10,
            max_empty_pages: 3,
            inter_page_delay_ms: 2000,
            session_timeout_secs: 300,
            proxy_enabled: false,
            proxy_pool: Vec::new(),
            proxy_source_urls: Vec::new(),
            proxy_refresh_secs: 10 * 60,
        }
    }
}

/// Load scraper configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to pick up `.env` files first.
///
/// # Errors
///
/// Returns [`ConfigError`] when a set variable fails to parse.
pub fn load_scrape_config() -> Result<ScrapeConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_scrape_config(|key| std::env::var(key))
}

/// Build a [`ScrapeConfig`] from the provided env-var lookup function.
fn build_scrape_config<F>(lookup: F) -> Result<ScrapeConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = ScrapeConfig::default();

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_u32 = |var: &str, default: u32| -> Result<u32, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_owned(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(true),
                "0" | "false" | "no" => Ok(false),
                other => Err(ConfigError::InvalidEnvVar {
                    var: var.to_owned(),
                    reason: format!("expected a boolean, got \"{other}\""),
                }),
            },
            Err(_) => Ok(default),
        }
    };

    let parse_list = |var: &str| -> Vec<String> {
        lookup(var)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    };
    let proxy_pool = parse_list("DIRSCOUT_PROXY_POOL");
    let proxy_source_urls = parse_list("DIRSCOUT_PROXY_SOURCES");

    Ok(ScrapeConfig {
        request_timeout_secs: parse_u64(
            "DIRSCOUT_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout_secs,
        )?,
        user_agent_rotation: parse_bool(
            "DIRSCOUT_USER_AGENT_ROTATION",
            defaults.user_agent_rotation,
        )?,
        rate_limit_secs: parse_u64("DIRSCOUT_RATE_LIMIT_SECS", defaults.rate_limit_secs)?,
        cache_ttl_secs: parse_u64("DIRSCOUT_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
        blocked_proxy_timeout_secs: parse_u64(
            "DIRSCOUT_BLOCKED_PROXY_TIMEOUT_SECS",
            defaults.blocked_proxy_timeout_secs,
        )?,
        max_retries: parse_u32("DIRSCOUT_MAX_RETRIES", defaults.max_retries)?,
        backoff_base_secs: parse_u64("DIRSCOUT_BACKOFF_BASE_SECS", defaults.backoff_base_secs)?,
        max_pages: parse_usize("DIRSCOUT_MAX_PAGES", defaults.max_pages)?,
        max_empty_pages: parse_usize("DIRSCOUT_MAX_EMPTY_PAGES", defaults.max_empty_pages)?,
        inter_page_delay_ms: parse_u64(
            "DIRSCOUT_INTER_PAGE_DELAY_MS",
            defaults.inter_page_delay_ms,
        )?,
        session_timeout_secs: parse_u64(
            "DIRSCOUT_SESSION_TIMEOUT_SECS",
            defaults.session_timeout_secs,
        )?,
        proxy_enabled: parse_bool("DIRSCOUT_PROXY_ENABLED", defaults.proxy_enabled)?,
        proxy_pool,
        proxy_source_urls,
        proxy_refresh_secs: parse_u64("DIRSCOUT_PROXY_REFRESH_SECS", defaults.proxy_refresh_secs)?,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
