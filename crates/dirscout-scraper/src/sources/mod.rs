//! Directory-site adapters and the shared page walker.
//!
//! An adapter knows three things about its site: how to build a page URL
//! from a query, which container selectors mark a listing card (sites ship
//! several historical markup variants at once, so the walker unions every
//! selector's matches), and optionally a result-count threshold that
//! signals the last page. Everything else — fetching, extraction,
//! termination — is shared.

pub mod justdial;
pub mod sulekha;
pub mod yell;
pub mod yellowpages;

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tokio::time::Instant;

use dirscout_core::{BusinessRecord, ScrapeConfig, SearchQuery};

use crate::extract::extract_record;
use crate::fetch::FetchCoordinator;
use crate::stats::ScrapeStats;

pub use justdial::JustDial;
pub use sulekha::Sulekha;
pub use yell::Yell;
pub use yellowpages::YellowPages;

pub trait SourceAdapter: Send + Sync {
    /// Stable lowercase identifier, recorded on every extracted record.
    fn name(&self) -> &'static str;

    /// URL of the given 1-based results page.
    fn page_url(&self, query: &SearchQuery, page: usize) -> String;

    /// Listing-container selectors, tried in order; matches are unioned.
    fn container_selectors(&self) -> &'static [&'static str];

    /// When a page yields fewer listings than this, it is the last page.
    fn last_page_threshold(&self) -> Option<usize> {
        None
    }
}

/// Every adapter the session runner knows about.
#[must_use]
pub fn all_adapters() -> Vec<Box<dyn SourceAdapter>> {
    vec![
        Box::new(JustDial),
        Box::new(Sulekha),
        Box::new(YellowPages),
        Box::new(Yell),
    ]
}

/// Walks one source page by page, strictly in order, and collects records.
///
/// A failed or empty page bumps the empty-page streak instead of aborting;
/// the walk stops on `max_empty_pages` consecutive empty pages, on
/// `max_pages`, on the adapter's last-page threshold, or when the session
/// deadline passes between pages. Collected records always survive.
pub(crate) async fn walk_source(
    adapter: &dyn SourceAdapter,
    query: &SearchQuery,
    coordinator: &FetchCoordinator,
    config: &ScrapeConfig,
    stats: &ScrapeStats,
    deadline: Instant,
) -> Vec<BusinessRecord> {
    let source = adapter.name();
    let mut records = Vec::new();
    let mut empty_streak = 0usize;

    for page in 1..=config.max_pages {
        if Instant::now() >= deadline {
            tracing::warn!(source, page, "session deadline reached, stopping walk");
            break;
        }
        if page > 1 {
            tokio::time::sleep(Duration::from_millis(config.inter_page_delay_ms)).await;
        }

        let url = adapter.page_url(query, page);
        tracing::debug!(source, page, url = %url, "fetching results page");

        let page_records = match coordinator.fetch_page(&url).await {
            Ok(body) => {
                stats.record_page();
                extract_page(&body, adapter)
            }
            Err(err) => {
                tracing::warn!(source, page, error = %err, "page fetch failed, treating as empty");
                stats.record_error(source, err.to_string());
                Vec::new()
            }
        };

        let page_count = page_records.len();
        if page_count == 0 {
            empty_streak += 1;
            if empty_streak >= config.max_empty_pages {
                tracing::info!(source, page, empty_streak, "stopping after consecutive empty pages");
                break;
            }
            continue;
        }

        empty_streak = 0;
        records.extend(page_records);

        if let Some(threshold) = adapter.last_page_threshold() {
            if page_count < threshold {
                tracing::debug!(source, page, page_count, threshold, "short page, assuming last");
                break;
            }
        }
    }

    stats.record_records(source, records.len() as u64);
    tracing::info!(source, count = records.len(), "source walk finished");
    records
}

/// Parses one page and extracts a record per listing container.
///
/// The document is walked once, so containers come out in document order
/// regardless of which selector variant matched them, and an element that
/// matches several variants extracts once.
///
/// Synchronous on purpose: the parsed DOM is not `Send` and must never be
/// held across an await point.
pub(crate) fn extract_page(body: &str, adapter: &dyn SourceAdapter) -> Vec<BusinessRecord> {
    let document = Html::parse_document(body);
    let selectors: Vec<Selector> = adapter
        .container_selectors()
        .iter()
        .filter_map(|raw| Selector::parse(raw).ok())
        .collect();

    let mut records = Vec::new();
    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if selectors.iter().any(|s| s.matches(&element)) {
            if let Some(record) = extract_record(element, adapter.name()) {
                records.push(record);
            }
        }
    }
    records
}

/// Lowercase-hyphen slug for URL path segments.
pub(crate) fn slugify(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// `Title-Case-With-Hyphens` path segment, the JustDial path convention.
pub(crate) fn title_slug(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TwoVariantAdapter;

    impl SourceAdapter for TwoVariantAdapter {
        fn name(&self) -> &'static str {
            "variant-test"
        }
        fn page_url(&self, _query: &SearchQuery, page: usize) -> String {
            format!("https://example.com/page-{page}")
        }
        fn container_selectors(&self) -> &'static [&'static str] {
            &["div.store-details", "div[class*='resultbox']"]
        }
    }

    #[test]
    fn unions_container_variants_without_double_extracting() {
        // The first card matches both selectors; it must extract once.
        let body = "<html><body>\
            <div class='store-details resultbox'><h2>Both Variants Cafe</h2></div>\
            <div class='store-details'><h2>Old Markup Cafe</h2></div>\
            <div class='resultbox'><h2>New Markup Cafe</h2></div>\
            </body></html>";
        let records = extract_page(body, &TwoVariantAdapter);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Both Variants Cafe", "Old Markup Cafe", "New Markup Cafe"]
        );
    }

    #[test]
    fn mixed_variants_extract_in_page_order() {
        // The second-selector card sits first on the page; it must still
        // come out first.
        let body = "<html><body>\
            <div class='resultbox'><h2>First On Page</h2></div>\
            <div class='store-details'><h2>Second On Page</h2></div>\
            <div class='resultbox'><h2>Third On Page</h2></div>\
            </body></html>";
        let records = extract_page(body, &TwoVariantAdapter);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First On Page", "Second On Page", "Third On Page"]);
    }

    #[test]
    fn skips_nameless_containers() {
        let body = "<html><body>\
            <div class='resultbox'><span class='phone'>9876543210</span></div>\
            <div class='resultbox'><h2>Named Cafe</h2></div>\
            </body></html>";
        let records = extract_page(body, &TwoVariantAdapter);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Named Cafe");
    }

    #[test]
    fn slug_helpers() {
        assert_eq!(slugify("Gyms Fitness"), "gyms-fitness");
        assert_eq!(title_slug("guitar classes"), "Guitar-Classes");
    }
}
