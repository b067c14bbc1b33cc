//! Fetch coordination: caching, per-domain rate limiting, user-agent
//! rotation, proxy selection, and retry policy in front of a [`Transport`].
//!
//! Every page request from a source walk goes through [`FetchCoordinator::fetch_page`].
//! The coordinator never parses HTML; it hands back raw bodies.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::prelude::IndexedRandom;
use rand::Rng;
use tokio::sync::Mutex;

use dirscout_core::ScrapeConfig;

use crate::error::ScrapeError;
use crate::rate_limit::retry_with_backoff;
use crate::stats::ScrapeStats;
use crate::transport::{RawResponse, Transport};

/// Desktop browser user agents rotated across requests.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:127.0) Gecko/20100101 Firefox/127.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// Wait before retrying a 429 that carried no `Retry-After` header.
const RETRY_AFTER_DEFAULT_SECS: u64 = 60;

struct CacheEntry {
    body: String,
    fetched_at: Instant,
}

/// Mutable fetch-policy state, guarded by one async mutex.
///
/// Held only to read/update bookkeeping; never across a network call.
#[derive(Default)]
struct PolicyState {
    cache: HashMap<String, CacheEntry>,
    /// Per-domain timestamp of the most recently scheduled fetch.
    last_fetch: HashMap<String, Instant>,
    /// Proxies that returned 403, with the time they were blocklisted.
    blocked_proxies: HashMap<String, Instant>,
    /// Proxies pulled from the configured list sources, appended to the
    /// configured pool.
    fetched_proxies: Vec<String>,
    last_proxy_refresh: Option<Instant>,
}

pub struct FetchCoordinator {
    config: ScrapeConfig,
    transport: Arc<dyn Transport>,
    stats: Arc<ScrapeStats>,
    state: Mutex<PolicyState>,
}

impl FetchCoordinator {
    #[must_use]
    pub fn new(config: ScrapeConfig, transport: Arc<dyn Transport>, stats: Arc<ScrapeStats>) -> Self {
        Self {
            config,
            transport,
            stats,
            state: Mutex::new(PolicyState::default()),
        }
    }

    /// Fetches one page body, applying the full fetch policy:
    ///
    /// 1. Fresh cache entries are returned without touching the network.
    /// 2. Fetches to the same domain are spaced `rate_limit_secs` apart.
    /// 3. The proxy pool is topped up from the configured list sources at
    ///    most once per refresh interval, then a random non-blocklisted
    ///    proxy is picked when the pool is enabled.
    /// 4. Transient failures retry with exponential backoff; a 403 through a
    ///    proxy blocklists that proxy and the next attempt goes direct.
    /// 5. Successful bodies are cached for `cache_ttl_secs`.
    ///
    /// # Errors
    ///
    /// Returns the last [`ScrapeError`] once retries are exhausted, or
    /// immediately for non-retriable statuses.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        if let Some(body) = self.cached(url).await {
            self.stats.record_cache_hit();
            tracing::debug!(url, "cache hit");
            return Ok(body);
        }

        self.respect_rate_limit(url).await;
        self.refresh_proxy_pool().await;

        let proxy_slot = Arc::new(Mutex::new(self.pick_proxy().await));
        let max_retries = self.config.max_retries;
        let backoff_base_secs = self.config.backoff_base_secs;

        let body = retry_with_backoff(max_retries, backoff_base_secs, || {
            let url = url.to_owned();
            let proxy_slot = Arc::clone(&proxy_slot);
            async move {
                let proxy = proxy_slot.lock().await.clone();
                self.stats.record_request();
                let response = self
                    .transport
                    .fetch(&url, &self.request_headers(&url), proxy.as_deref())
                    .await
                    .inspect_err(|_| self.stats.record_request_failed())?;
                match self.classify(&url, &response) {
                    Ok(body) => {
                        self.stats.record_request_ok();
                        Ok(body)
                    }
                    Err(ScrapeError::Blocked { status, url }) => {
                        self.stats.record_request_blocked();
                        // Burn the proxy and fall back to a direct request
                        // on the next attempt.
                        let mut slot = proxy_slot.lock().await;
                        if let Some(burned) = slot.take() {
                            tracing::warn!(proxy = %burned, status, "proxy blocked, falling back to direct");
                            self.blocklist_proxy(burned).await;
                        }
                        Err(ScrapeError::Blocked { status, url })
                    }
                    Err(err @ ScrapeError::RateLimited { .. }) => {
                        self.stats.record_request_blocked();
                        Err(err)
                    }
                    Err(err) => {
                        self.stats.record_request_failed();
                        Err(err)
                    }
                }
            }
        })
        .await?;

        self.store_cached(url, body.clone()).await;
        Ok(body)
    }

    /// Maps an HTTP response to a body or a policy error.
    fn classify(&self, url: &str, response: &RawResponse) -> Result<String, ScrapeError> {
        match response.status {
            200..=299 => Ok(response.body.clone()),
            429 => Err(ScrapeError::RateLimited {
                domain: domain_of(url).to_owned(),
                retry_after_secs: response.retry_after_secs.unwrap_or(RETRY_AFTER_DEFAULT_SECS),
            }),
            403 => Err(ScrapeError::Blocked {
                status: 403,
                url: url.to_owned(),
            }),
            500..=599 => Err(ScrapeError::ServerError {
                status: response.status,
                url: url.to_owned(),
            }),
            other => Err(ScrapeError::UnexpectedStatus {
                status: other,
                url: url.to_owned(),
            }),
        }
    }

    fn request_headers(&self, url: &str) -> Vec<(&'static str, String)> {
        let user_agent = if self.config.user_agent_rotation {
            let mut rng = rand::rng();
            USER_AGENTS
                .choose(&mut rng)
                .copied()
                .unwrap_or(USER_AGENTS[0])
        } else {
            USER_AGENTS[0]
        };
        vec![
            ("User-Agent", user_agent.to_owned()),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_owned(),
            ),
            ("Accept-Language", "en-US,en;q=0.9".to_owned()),
            ("Referer", format!("https://{}/", domain_of(url))),
            ("DNT", "1".to_owned()),
            ("Connection", "keep-alive".to_owned()),
        ]
    }

    async fn cached(&self, url: &str) -> Option<String> {
        let ttl = Duration::from_secs(self.config.cache_ttl_secs);
        let mut state = self.state.lock().await;
        match state.cache.get(url) {
            Some(entry) if entry.fetched_at.elapsed() < ttl => Some(entry.body.clone()),
            Some(_) => {
                state.cache.remove(url);
                None
            }
            None => None,
        }
    }

    async fn store_cached(&self, url: &str, body: String) {
        let mut state = self.state.lock().await;
        state.cache.insert(
            url.to_owned(),
            CacheEntry {
                body,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Sleeps until the domain's rate-limit window has passed, reserving the
    /// next slot before releasing the lock so concurrent walks stay spaced.
    async fn respect_rate_limit(&self, url: &str) {
        let interval = Duration::from_secs(self.config.rate_limit_secs);
        if interval.is_zero() {
            return;
        }
        let domain = domain_of(url).to_owned();
        let wait = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            let next_allowed = state
                .last_fetch
                .get(&domain)
                .map_or(now, |last| *last + interval);
            let slot = next_allowed.max(now);
            state.last_fetch.insert(domain.clone(), slot);
            slot.saturating_duration_since(now)
        };
        if !wait.is_zero() {
            tracing::debug!(domain = %domain, wait_ms = wait.as_millis() as u64, "rate limit wait");
            tokio::time::sleep(wait).await;
        }
    }

    /// Tops up the proxy pool from the configured list sources.
    ///
    /// Idempotent within `proxy_refresh_secs`: the first caller stamps the
    /// refresh time and fetches, later callers return without network
    /// traffic, so every page fetch can call this unconditionally. Source
    /// failures only shrink the haul; they never fail the page fetch.
    async fn refresh_proxy_pool(&self) {
        if !self.config.proxy_enabled || self.config.proxy_source_urls.is_empty() {
            return;
        }
        {
            let interval = Duration::from_secs(self.config.proxy_refresh_secs);
            let mut state = self.state.lock().await;
            let fresh = state
                .last_proxy_refresh
                .is_some_and(|at| at.elapsed() < interval);
            if fresh {
                return;
            }
            state.last_proxy_refresh = Some(Instant::now());
        }

        let mut found = Vec::new();
        for source in &self.config.proxy_source_urls {
            match self
                .transport
                .fetch(source, &self.request_headers(source), None)
                .await
            {
                Ok(response) if (200..=299).contains(&response.status) => {
                    found.extend(parse_proxy_list(&response.body));
                }
                Ok(response) => {
                    tracing::warn!(source = %source, status = response.status, "proxy source rejected the request");
                }
                Err(err) => {
                    tracing::warn!(source = %source, error = %err, "proxy source fetch failed");
                }
            }
        }

        let mut state = self.state.lock().await;
        for proxy in found {
            if !self.config.proxy_pool.contains(&proxy) && !state.fetched_proxies.contains(&proxy) {
                state.fetched_proxies.push(proxy);
            }
        }
        tracing::info!(
            pool_size = self.config.proxy_pool.len() + state.fetched_proxies.len(),
            "proxy pool refreshed"
        );
    }

    /// Picks a random proxy from the pool, skipping blocklisted ones whose
    /// timeout has not expired. Expired entries are dropped on the way.
    async fn pick_proxy(&self) -> Option<String> {
        if !self.config.proxy_enabled {
            return None;
        }
        let timeout = Duration::from_secs(self.config.blocked_proxy_timeout_secs);
        let mut state = self.state.lock().await;
        state
            .blocked_proxies
            .retain(|_, blocked_at| blocked_at.elapsed() < timeout);
        let candidates: Vec<String> = self
            .config
            .proxy_pool
            .iter()
            .chain(state.fetched_proxies.iter())
            .filter(|p| !state.blocked_proxies.contains_key(*p))
            .cloned()
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..candidates.len());
        Some(candidates[index].clone())
    }

    async fn blocklist_proxy(&self, proxy: String) {
        let mut state = self.state.lock().await;
        state.blocked_proxies.insert(proxy, Instant::now());
    }
}

/// Parses a plain-text proxy list: one `host:port` or full proxy URL per
/// line. Bare `host:port` lines get an `http://` scheme; anything else is
/// skipped.
fn parse_proxy_list(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.starts_with("http://") || line.starts_with("https://") {
                return Some(line.to_owned());
            }
            let (host, port) = line.split_once(':')?;
            if host.is_empty() || port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Some(format!("http://{line}"))
        })
        .collect()
}

/// Extracts the host portion of a URL, used as the rate-limit key.
fn domain_of(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}
