//! Sulekha adapter.
//!
//! Sulekha routes searches through fixed category slugs rather than free
//! text, so common categories map through a table and anything unknown
//! falls back to a plain lowercase slug.

use dirscout_core::SearchQuery;

use super::{slugify, SourceAdapter};

/// Category keyword to Sulekha's canonical slug. Matched on whole words of
/// the lowercased category, first hit wins.
const CATEGORY_SLUGS: &[(&str, &str)] = &[
    ("hotel", "hotels-resorts"),
    ("hotels", "hotels-resorts"),
    ("resort", "hotels-resorts"),
    ("restaurant", "restaurants"),
    ("restaurants", "restaurants"),
    ("gym", "gyms-fitness-centres"),
    ("gyms", "gyms-fitness-centres"),
    ("fitness", "gyms-fitness-centres"),
    ("doctor", "doctors"),
    ("doctors", "doctors"),
    ("hospital", "hospitals"),
    ("hospitals", "hospitals"),
    ("plumber", "plumbing-contractors"),
    ("plumbers", "plumbing-contractors"),
    ("electrician", "electricians"),
    ("electricians", "electricians"),
    ("salon", "beauty-parlours-salons"),
    ("salons", "beauty-parlours-salons"),
    ("packers", "packers-movers"),
    ("movers", "packers-movers"),
    ("tutor", "tuitions"),
    ("tuition", "tuitions"),
    ("tuitions", "tuitions"),
];

/// City slug used when the query has no location.
const DEFAULT_LOCATION: &str = "india";

pub struct Sulekha;

impl Sulekha {
    fn category_slug(category: &str) -> String {
        let lowered = category.to_lowercase();
        lowered
            .split_whitespace()
            .find_map(|word| {
                CATEGORY_SLUGS
                    .iter()
                    .find(|(keyword, _)| *keyword == word)
                    .map(|(_, slug)| (*slug).to_owned())
            })
            .unwrap_or_else(|| slugify(category))
    }
}

impl SourceAdapter for Sulekha {
    fn name(&self) -> &'static str {
        "sulekha"
    }

    fn page_url(&self, query: &SearchQuery, page: usize) -> String {
        let location = query
            .location
            .as_deref()
            .map_or_else(|| DEFAULT_LOCATION.to_owned(), slugify);
        let category = Self::category_slug(&query.category);
        if page == 1 {
            format!("https://www.sulekha.com/{category}/{location}")
        } else {
            format!("https://www.sulekha.com/{category}/{location}?page={page}")
        }
    }

    fn container_selectors(&self) -> &'static [&'static str] {
        &[
            "div.sk-biz",
            "div[class*='business-card']",
            "section[class*='listing']",
            "div.list-item",
        ]
    }
}
