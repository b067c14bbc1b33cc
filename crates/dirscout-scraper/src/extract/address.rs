//! Address extraction.
//!
//! Listings expose addresses through schema.org microdata, address-ish class
//! names, or plain text blocks, and one card can legitimately carry more
//! than one address. All distinct candidates are kept and joined rather
//! than picking one arbitrarily.

use scraper::{ElementRef, Selector};

use super::text::{collapse_whitespace, element_text};

/// Separator between distinct address blocks in the output field.
const ADDRESS_SEPARATOR: &str = " | ";

/// Containers worth scanning for an address, in preference order.
const CONTAINER_SELECTORS: &[&str] = &[
    "[itemprop='address']",
    "address",
    "[class*='address']",
    "[class*='Address']",
    "[class*='location']",
    "[class*='locality']",
];

/// Microdata parts joined in postal order when present.
const MICRODATA_PARTS: &[&str] = &[
    "[itemprop='streetAddress']",
    "[itemprop='addressLocality']",
    "[itemprop='addressRegion']",
    "[itemprop='postalCode']",
];

/// Leading labels stripped from free-text addresses.
const LABEL_PREFIXES: &[&str] = &[
    "full address:",
    "map address:",
    "address:",
    "location:",
    "addr:",
];

/// Collects every plausible address from a listing fragment.
///
/// Structured microdata parts are preferred per container; containers fall
/// back to their full text. Fragments of 10 characters or fewer, or with no
/// letters at all, are discarded as noise. Distinct survivors (compared
/// case-insensitively, first seen wins) are joined with `" | "`.
#[must_use]
pub fn extract_address(fragment: ElementRef<'_>) -> Option<String> {
    let mut seen_lowered: Vec<String> = Vec::new();
    let mut kept: Vec<String> = Vec::new();

    let mut consider = |candidate: String| {
        if !plausible_address(&candidate) {
            return;
        }
        let lowered = candidate.to_lowercase();
        if seen_lowered.iter().any(|s| *s == lowered) {
            return;
        }
        seen_lowered.push(lowered);
        kept.push(candidate);
    };

    for raw_selector in CONTAINER_SELECTORS {
        let Ok(selector) = Selector::parse(raw_selector) else {
            continue;
        };
        for container in fragment.select(&selector) {
            let candidate = microdata_address(container)
                .unwrap_or_else(|| strip_label(&element_text(container)));
            consider(candidate);
        }
    }

    // Some cards stash the full address in a data attribute instead.
    if let Ok(selector) = Selector::parse("[data-address]") {
        for element in fragment.select(&selector) {
            if let Some(value) = element.value().attr("data-address") {
                consider(strip_label(&collapse_whitespace(value)));
            }
        }
    }

    if kept.is_empty() {
        None
    } else {
        Some(kept.join(ADDRESS_SEPARATOR))
    }
}

/// Joins microdata parts in fixed postal order, when the container has any.
fn microdata_address(container: ElementRef<'_>) -> Option<String> {
    let mut parts = Vec::new();
    for raw_selector in MICRODATA_PARTS {
        let selector = Selector::parse(raw_selector).ok()?;
        if let Some(part) = container.select(&selector).next() {
            let text = element_text(part);
            if !text.is_empty() {
                parts.push(text);
            }
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn strip_label(text: &str) -> String {
    let lowered = text.to_lowercase();
    for prefix in LABEL_PREFIXES {
        if lowered.starts_with(prefix) {
            return text[prefix.len()..].trim().to_owned();
        }
    }
    text.to_owned()
}

/// An address must be longer than 10 characters and not purely numeric.
fn plausible_address(candidate: &str) -> bool {
    candidate.len() > 10 && candidate.chars().any(char::is_alphabetic)
}
