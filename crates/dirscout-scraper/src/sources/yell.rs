//! Yell (UK) adapter.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use dirscout_core::SearchQuery;

use super::SourceAdapter;

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

pub struct Yell;

impl SourceAdapter for Yell {
    fn name(&self) -> &'static str {
        "yell"
    }

    fn page_url(&self, query: &SearchQuery, page: usize) -> String {
        let keywords = utf8_percent_encode(&query.category, QUERY_VALUE);
        let location = query
            .location
            .as_deref()
            .map(|l| utf8_percent_encode(l, QUERY_VALUE).to_string())
            .unwrap_or_default();
        format!(
            "https://www.yell.com/ucs/UcsSearchAction.do?keywords={keywords}&location={location}&pageNum={page}"
        )
    }

    fn container_selectors(&self) -> &'static [&'static str] {
        &[
            "div[class*='businessCapsule']",
            "article[class*='businessCapsule']",
            "div.result",
        ]
    }
}
