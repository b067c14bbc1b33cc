//! Site-agnostic field extraction from listing fragments.
//!
//! No single CSS selector is trusted: every field is resolved through an
//! ordered fallback table, first non-empty match wins. Adapters hand over a
//! listing container; this module turns it into a [`BusinessRecord`] or
//! nothing. A fragment that yields no name yields no record.

pub mod address;
pub mod links;
pub mod phone;
pub mod text;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use dirscout_core::BusinessRecord;

use self::address::extract_address;
use self::links::classify_links;
use self::phone::decode_phone;
use self::text::{element_text, first_decimal, first_integer};

const NAME_SELECTORS: &[&str] = &[
    "[class*='resultbox_title']",
    "[itemprop='name']",
    "h2[class*='title'] a",
    "[class*='business-name']",
    "[class*='store-name']",
    "[class*='lng_cont_name']",
    "span.jcn a",
    "[class*='bname']",
    "[data-test='business-name']",
    "h2 a",
    "h3 a",
    "h2",
    "h3",
];

const PHONE_SELECTORS: &[&str] = &[
    "[class*='callcontent']",
    "[class*='contact-number']",
    "[class*='mobilesv']",
    "[class*='phone']",
    "[class*='telephone']",
    "a[href^='tel:']",
    "[data-phone]",
    "[data-tel]",
];

const RATING_SELECTORS: &[&str] = &[
    "[itemprop='ratingValue']",
    "[class*='rating']",
    "[class*='star-rating']",
];

const REVIEWS_SELECTORS: &[&str] = &[
    "[itemprop='reviewCount']",
    "[class*='review']",
    "[class*='votes']",
];

const CATEGORY_SELECTORS: &[&str] = &["[itemprop='category']", "[class*='categor']"];

const DESCRIPTION_SELECTORS: &[&str] = &[
    "[itemprop='description']",
    "[class*='description']",
    "[class*='snippet']",
    "[class*='about']",
];

static OWNER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:Owner|Proprietor|Manager|CEO|Founder|Director|Contact)\s*[:\-]|Founded by)\s*([A-Z][A-Za-z.']*(?:\s+[A-Z][A-Za-z.']*){0,3})",
    )
    .expect("owner pattern is valid")
});

/// Extracts one [`BusinessRecord`] from a listing fragment.
///
/// Returns `None` when no non-empty business name can be found; every other
/// field is optional and independently best-effort.
#[must_use]
pub fn extract_record(fragment: ElementRef<'_>, source: &str) -> Option<BusinessRecord> {
    let name = first_selector_text(fragment, NAME_SELECTORS)?;

    // A listing can expose several numbers (landline plus mobile); keep
    // every distinct one, in document order, joined with " / ".
    let mut phones: Vec<String> = Vec::new();
    for selector in PHONE_SELECTORS
        .iter()
        .filter_map(|raw| Selector::parse(raw).ok())
    {
        for decoded in fragment.select(&selector).map(decode_phone) {
            if !decoded.is_empty() && !phones.contains(&decoded) {
                phones.push(decoded);
            }
        }
    }
    let phone = if phones.is_empty() {
        None
    } else {
        Some(phones.join(" / "))
    };

    let rating = RATING_SELECTORS
        .iter()
        .filter_map(|raw| Selector::parse(raw).ok())
        .filter_map(|selector| {
            fragment
                .select(&selector)
                .find_map(|el| first_decimal(&element_text(el)))
        })
        .find(|value| (0.0..=5.0).contains(value));

    let reviews_count = REVIEWS_SELECTORS
        .iter()
        .filter_map(|raw| Selector::parse(raw).ok())
        .find_map(|selector| {
            fragment
                .select(&selector)
                .find_map(|el| first_integer(&element_text(el)))
        });

    let categories = collect_distinct_texts(fragment, CATEGORY_SELECTORS);
    let description = first_selector_text(fragment, DESCRIPTION_SELECTORS);
    let owner_name = OWNER_PATTERN
        .captures(&element_text(fragment))
        .map(|captures| captures[1].trim().to_owned());

    let links = classify_links(fragment);
    let social_links = if links.social.is_empty() {
        None
    } else {
        Some(links.social.join(", "))
    };

    let record = BusinessRecord {
        name,
        phone,
        email: links.email,
        website: links.website,
        address: extract_address(fragment),
        rating,
        reviews_count,
        categories,
        description,
        owner_name,
        social_links,
        source: source.to_owned(),
    };
    record.has_name().then_some(record)
}

/// First non-empty text across the selector table, in table order.
fn first_selector_text(fragment: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|raw| Selector::parse(raw).ok())
        .find_map(|selector| {
            fragment
                .select(&selector)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
}

/// Distinct non-empty texts (case-insensitive, first seen wins) across the
/// selector table, joined with `", "`.
fn collect_distinct_texts(fragment: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    let mut seen_lowered: Vec<String> = Vec::new();
    let mut kept: Vec<String> = Vec::new();
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in fragment.select(&selector) {
            let value = element_text(element);
            if value.is_empty() {
                continue;
            }
            let lowered = value.to_lowercase();
            if seen_lowered.iter().any(|s| *s == lowered) {
                continue;
            }
            seen_lowered.push(lowered);
            kept.push(value);
        }
    }
    if kept.is_empty() {
        None
    } else {
        Some(kept.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    fn fragment(html: &Html) -> ElementRef<'_> {
        let selector = Selector::parse("div.card").unwrap();
        html.select(&selector).next().unwrap()
    }

    #[test]
    fn full_listing_extracts_every_field() {
        let html = Html::parse_fragment(
            "<div class='card'>\
             <h2 class='resultbox_title_anchor'>Acme Hardware</h2>\
             <span class='callcontent'>9876543210</span>\
             <p class='address'>12 MG Road, Fort, Mumbai</p>\
             <span class='rating-value'>4.5</span>\
             <span class='review-count'>1,234 Ratings</span>\
             <span class='category-tag'>Hardware Stores</span>\
             <p class='description'>Owner: Ramesh Gupta runs this store since 1990.</p>\
             <a href='mailto:acme@acme.in'>mail</a>\
             <a href='https://www.acme.in'>website</a>\
             <a href='https://facebook.com/acmehw'>fb</a>\
             </div>",
        );
        let record = extract_record(fragment(&html), "justdial").unwrap();
        assert_eq!(record.name, "Acme Hardware");
        assert_eq!(record.phone.as_deref(), Some("+91 987-654-3210"));
        assert_eq!(record.address.as_deref(), Some("12 MG Road, Fort, Mumbai"));
        assert_eq!(record.rating, Some(4.5));
        assert_eq!(record.reviews_count, Some(1234));
        assert_eq!(record.categories.as_deref(), Some("Hardware Stores"));
        assert_eq!(record.owner_name.as_deref(), Some("Ramesh Gupta"));
        assert_eq!(record.email.as_deref(), Some("acme@acme.in"));
        assert_eq!(record.website.as_deref(), Some("https://www.acme.in"));
        assert_eq!(
            record.social_links.as_deref(),
            Some("https://facebook.com/acmehw")
        );
        assert_eq!(record.source, "justdial");
    }

    #[test]
    fn nameless_fragment_yields_nothing() {
        let html = Html::parse_fragment(
            "<div class='card'><span class='phone'>9876543210</span></div>",
        );
        assert!(extract_record(fragment(&html), "justdial").is_none());
    }

    #[test]
    fn missing_rating_stays_unknown_not_zero() {
        let html = Html::parse_fragment(
            "<div class='card'><h2>Corner Cafe</h2></div>",
        );
        let record = extract_record(fragment(&html), "yell").unwrap();
        assert_eq!(record.rating, None);
        assert_eq!(record.reviews_count, None);
    }

    #[test]
    fn rating_above_five_is_ignored() {
        let html = Html::parse_fragment(
            "<div class='card'><h2>Corner Cafe</h2>\
             <span class='rating'>87 people rated this</span></div>",
        );
        let record = extract_record(fragment(&html), "yell").unwrap();
        assert_eq!(record.rating, None);
    }

    #[test]
    fn obfuscated_phone_decodes_through_selector_table() {
        let html = Html::parse_fragment(
            "<div class='card'><h3>Glyph Motors</h3>\
             <span class='mobilesv'>\
             <span class='icon-ji'></span><span class='icon-lk'></span>\
             <span class='icon-nm'></span><span class='icon-po'></span>\
             <span class='icon-rq'></span><span class='icon-ts'></span>\
             <span class='icon-vu'></span><span class='icon-wx'></span>\
             <span class='icon-yz'></span><span class='icon-acb'></span>\
             </span></div>",
        );
        let record = extract_record(fragment(&html), "justdial").unwrap();
        assert_eq!(record.phone.as_deref(), Some("+91 987-654-3210"));
    }
}
