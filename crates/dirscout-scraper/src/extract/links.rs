//! Anchor classification: email, external website, social profiles.

use scraper::{ElementRef, Selector};

/// Social platforms recognized as profile links, never as the business
/// website.
const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
];

/// Directory sites themselves; links back to them are navigation, not the
/// business website.
const DIRECTORY_DOMAINS: &[&str] = &[
    "justdial.com",
    "sulekha.com",
    "yellowpages.com",
    "yell.com",
];

/// A crude external-link signal: the href must contain one of these.
const KNOWN_TLDS: &[&str] = &[".com", ".in", ".org", ".net", ".co", ".io", ".biz", ".info"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ClassifiedLinks {
    pub email: Option<String>,
    pub website: Option<String>,
    pub social: Vec<String>,
}

/// Scans every anchor under `fragment` and buckets the first email, the
/// first plausible external website, and all social profile links.
#[must_use]
pub fn classify_links(fragment: ElementRef<'_>) -> ClassifiedLinks {
    let mut links = ClassifiedLinks::default();
    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for anchor in fragment.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();

        if let Some(address) = href.strip_prefix("mailto:") {
            let address = address.split('?').next().unwrap_or(address).trim();
            if links.email.is_none() && address.contains('@') {
                links.email = Some(address.to_owned());
            }
            continue;
        }

        let lowered = href.to_lowercase();
        if SOCIAL_DOMAINS.iter().any(|d| lowered.contains(d)) {
            if !links.social.iter().any(|s| s == href) {
                links.social.push(href.to_owned());
            }
            continue;
        }

        if links.website.is_none() && is_external_website(&lowered) {
            links.website = Some(href.to_owned());
        }
    }

    links
}

fn is_external_website(lowered_href: &str) -> bool {
    if !lowered_href.starts_with("http://") && !lowered_href.starts_with("https://") {
        return false;
    }
    if DIRECTORY_DOMAINS.iter().any(|d| lowered_href.contains(d)) {
        return false;
    }
    KNOWN_TLDS.iter().any(|tld| lowered_href.contains(tld))
}
