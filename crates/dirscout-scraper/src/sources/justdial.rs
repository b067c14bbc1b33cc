//! JustDial adapter.
//!
//! Paths use `Title-Case-With-Hyphens` segments: `/Mumbai/Hotels/page-2`.
//! JustDial is the source that obfuscates phone digits behind icon-font
//! classes, which the shared phone decoder handles.

use dirscout_core::SearchQuery;

use super::{title_slug, SourceAdapter};

/// Path segment used when the query carries no location; JustDial's
/// country-wide search page.
const DEFAULT_LOCATION: &str = "India";

pub struct JustDial;

impl SourceAdapter for JustDial {
    fn name(&self) -> &'static str {
        "justdial"
    }

    fn page_url(&self, query: &SearchQuery, page: usize) -> String {
        let location = query
            .location
            .as_deref()
            .map_or_else(|| DEFAULT_LOCATION.to_owned(), title_slug);
        let category = title_slug(&query.category);
        if page == 1 {
            format!("https://www.justdial.com/{location}/{category}")
        } else {
            format!("https://www.justdial.com/{location}/{category}/page-{page}")
        }
    }

    fn container_selectors(&self) -> &'static [&'static str] {
        // Markup variants observed across A/B-tested result pages.
        &[
            "li.cntanr",
            "div.resultbox",
            "div[class*='resultbox_info']",
            "div.store-details",
            "li[class*='jcar']",
        ]
    }
}
