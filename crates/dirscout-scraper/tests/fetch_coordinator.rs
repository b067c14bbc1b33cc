//! Integration tests for `FetchCoordinator::fetch_page`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no
//! real network traffic is made. Covers the cache, the retry policy per
//! status class, and terminal failures.

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dirscout_core::ScrapeConfig;
use dirscout_scraper::{FetchCoordinator, HttpTransport, ScrapeError, ScrapeStats};

/// Config with every delay zeroed so tests run instantly.
fn fast_config(max_retries: u32) -> ScrapeConfig {
    ScrapeConfig {
        rate_limit_secs: 0,
        backoff_base_secs: 0,
        inter_page_delay_ms: 0,
        max_retries,
        ..ScrapeConfig::default()
    }
}

fn coordinator(config: ScrapeConfig) -> (FetchCoordinator, Arc<ScrapeStats>) {
    let stats = Arc::new(ScrapeStats::new());
    let transport = Arc::new(HttpTransport::new(5));
    (
        FetchCoordinator::new(config, transport, Arc::clone(&stats)),
        stats,
    )
}

#[tokio::test]
async fn second_fetch_within_ttl_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Mumbai/Hotels"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>listings</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let (coordinator, stats) = coordinator(fast_config(0));
    let url = format!("{}/Mumbai/Hotels", server.uri());

    let first = coordinator.fetch_page(&url).await.unwrap();
    let second = coordinator.fetch_page(&url).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(stats.cache_hits(), 1);
    assert_eq!(stats.requests_made(), 1);
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let (coordinator, stats) = coordinator(fast_config(3));
    let body = coordinator
        .fetch_page(&format!("{}/search", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<html>ok</html>");
    assert_eq!(stats.requests_made(), 3);
}

#[tokio::test]
async fn rate_limited_response_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(429).insert_header("Retry-After", "0"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let (coordinator, _stats) = coordinator(fast_config(1));
    let body = coordinator
        .fetch_page(&format!("{}/search", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn not_found_fails_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (coordinator, stats) = coordinator(fast_config(3));
    let result = coordinator
        .fetch_page(&format!("{}/gone", server.uri()))
        .await;

    assert!(matches!(
        result,
        Err(ScrapeError::UnexpectedStatus { status: 404, .. })
    ));
    assert_eq!(stats.requests_made(), 1);
}

#[tokio::test]
async fn forbidden_without_proxy_exhausts_retries_and_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (coordinator, stats) = coordinator(fast_config(1));
    let result = coordinator
        .fetch_page(&format!("{}/blocked", server.uri()))
        .await;

    assert!(matches!(
        result,
        Err(ScrapeError::Blocked { status: 403, .. })
    ));
    // Initial attempt plus one retry.
    assert_eq!(stats.requests_made(), 2);
}

#[tokio::test]
async fn failed_fetch_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>recovered</html>"))
        .mount(&server)
        .await;

    let (coordinator, stats) = coordinator(fast_config(0));
    let url = format!("{}/flaky", server.uri());

    assert!(coordinator.fetch_page(&url).await.is_err());
    let body = coordinator.fetch_page(&url).await.unwrap();
    assert_eq!(body, "<html>recovered</html>");
    assert_eq!(stats.cache_hits(), 0);
}
