//! HTTP transport abstraction.
//!
//! The fetch coordinator talks to the network only through the [`Transport`]
//! trait, so integration tests can substitute a canned implementation and
//! unit-test the caching, retry, and proxy policies without sockets.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::ScrapeError;

/// A fetched response, reduced to what the fetch policy cares about.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    /// Parsed `Retry-After` header, when the server sent one.
    pub retry_after_secs: Option<u64>,
}

/// One HTTP GET. Implementations must not retry or cache; both are the
/// coordinator's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        proxy: Option<&str>,
    ) -> Result<RawResponse, ScrapeError>;
}

/// [`Transport`] backed by `reqwest`.
///
/// `reqwest` fixes the proxy at client-build time, so one client is built
/// lazily per proxy URL (plus one for direct connections) and reused.
pub struct HttpTransport {
    timeout: Duration,
    clients: Mutex<HashMap<Option<String>, reqwest::Client>>,
}

impl HttpTransport {
    #[must_use]
    pub fn new(request_timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(request_timeout_secs),
            clients: Mutex::new(HashMap::new()),
        }
    }

    async fn client_for(&self, proxy: Option<&str>) -> Result<reqwest::Client, ScrapeError> {
        let key = proxy.map(str::to_owned);
        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(5));
        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        let client = builder.build()?;
        clients.insert(key, client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        proxy: Option<&str>,
    ) -> Result<RawResponse, ScrapeError> {
        let client = self.client_for(proxy).await?;
        let mut request = client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        let response = request.send().await?;

        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            body,
            retry_after_secs,
        })
    }
}
