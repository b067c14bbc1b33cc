//! YellowPages adapter.
//!
//! Plain query-string search; a full page carries 30 results, so a shorter
//! page is the last one.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use dirscout_core::SearchQuery;

use super::SourceAdapter;

/// Characters escaped in query-string values.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'?');

/// Results per full page.
const PAGE_SIZE: usize = 30;

pub struct YellowPages;

impl SourceAdapter for YellowPages {
    fn name(&self) -> &'static str {
        "yellowpages"
    }

    fn page_url(&self, query: &SearchQuery, page: usize) -> String {
        let terms = utf8_percent_encode(&query.category, QUERY_VALUE);
        let geo = query
            .location
            .as_deref()
            .map(|l| utf8_percent_encode(l, QUERY_VALUE).to_string())
            .unwrap_or_default();
        format!(
            "https://www.yellowpages.com/search?search_terms={terms}&geo_location_terms={geo}&page={page}"
        )
    }

    fn container_selectors(&self) -> &'static [&'static str] {
        &[
            "div.result",
            "div[class*='search-results'] div.v-card",
            "div[class*='organic'] div[class*='listing']",
        ]
    }

    fn last_page_threshold(&self) -> Option<usize> {
        Some(PAGE_SIZE)
    }
}
