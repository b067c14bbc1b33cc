//! Phone extraction and deobfuscation.
//!
//! Directory sites render phone numbers behind private font glyphs: each
//! digit is an empty element whose CSS class selects a glyph from a custom
//! font. The class-to-symbol table below was reverse engineered from one
//! observed scheme; unknown classes decode to nothing, so a newer variant
//! degrades to an empty (rejected) number instead of a wrong one.

use scraper::{ElementRef, Selector};

use super::text::element_text;

/// Icon-class suffix to symbol. Checked after stripping the known
/// `icon-`/`jd-`/`tel-` prefixes.
const GLYPH_MAP: &[(&str, char)] = &[
    ("dc", '+'),
    ("fe", '('),
    ("hg", ')'),
    ("ba", '-'),
    ("acb", '0'),
    ("yz", '1'),
    ("wx", '2'),
    ("vu", '3'),
    ("ts", '4'),
    ("rq", '5'),
    ("po", '6'),
    ("nm", '7'),
    ("lk", '8'),
    ("ji", '9'),
    ("zero", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
    ("plus", '+'),
];

const GLYPH_PREFIXES: &[&str] = &["icon-", "jd-", "tel-"];

/// Data attributes that sometimes carry the plain number when the visible
/// text is obfuscated.
const DATA_ATTRS: &[&str] = &["data-href", "data-phone", "data-tel", "data-value"];

/// Country code prepended to bare 10-digit national numbers.
const DEFAULT_COUNTRY_CODE: &str = "91";

/// Extracts a phone number from a candidate element, trying in order:
/// visible text, icon-class glyph decoding over `span`/`a`/`b` children,
/// digit-bearing data attributes, then a `tel:` href.
///
/// Returns an empty string when nothing decodes to at least 5 digits;
/// malformed input never panics.
#[must_use]
pub fn decode_phone(element: ElementRef<'_>) -> String {
    let text = element_text(element);
    if !text.trim().is_empty() {
        let formatted = format_phone(&text);
        if !formatted.is_empty() {
            return formatted;
        }
    }

    let glyphs = decode_glyph_classes(element);
    if !glyphs.is_empty() {
        let formatted = format_phone(&glyphs);
        if !formatted.is_empty() {
            return formatted;
        }
    }

    for attr in DATA_ATTRS {
        if let Some(value) = element.value().attr(attr) {
            if value.chars().any(|c| c.is_ascii_digit()) {
                let formatted = format_phone(value);
                if !formatted.is_empty() {
                    return formatted;
                }
            }
        }
    }

    if let Some(href) = element.value().attr("href") {
        if let Some(number) = href.strip_prefix("tel:") {
            return format_phone(number);
        }
    }
    // The element itself may wrap an anchor carrying the tel: link.
    if let Ok(selector) = Selector::parse("a[href^='tel:']") {
        if let Some(anchor) = element.select(&selector).next() {
            if let Some(number) = anchor
                .value()
                .attr("href")
                .and_then(|h| h.strip_prefix("tel:"))
            {
                return format_phone(number);
            }
        }
    }

    String::new()
}

/// Concatenates glyph symbols decoded from child element classes, in
/// document order.
fn decode_glyph_classes(element: ElementRef<'_>) -> String {
    let Ok(selector) = Selector::parse("span, a, b") else {
        return String::new();
    };
    let mut decoded = String::new();
    for child in element.select(&selector) {
        for class in child.value().classes() {
            if let Some(symbol) = glyph_for(class) {
                decoded.push(symbol);
            }
        }
    }
    decoded
}

fn glyph_for(class: &str) -> Option<char> {
    let mut name = class;
    for prefix in GLYPH_PREFIXES {
        if let Some(stripped) = name.strip_prefix(prefix) {
            name = stripped;
        }
    }
    GLYPH_MAP
        .iter()
        .find(|(glyph, _)| *glyph == name)
        .map(|(_, symbol)| *symbol)
}

/// Sanitizes and formats a raw phone candidate.
///
/// Keeps only digits and `+-() `, then formats by digit count: fewer than
/// 5 digits is rejected as noise (empty string); exactly 10 gets the
/// default country code and `XXX-XXX-XXXX` hyphenation; more than 10
/// treats the leading 1–2 digits as the country code.
#[must_use]
pub fn format_phone(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(*c, '+' | '-' | '(' | ')' | ' '))
        .collect();
    let digits: String = kept.chars().filter(char::is_ascii_digit).collect();

    match digits.len() {
        0..=4 => String::new(),
        5..=9 => digits,
        10 => format!("+{DEFAULT_COUNTRY_CODE} {}", hyphenate(&digits)),
        n => {
            let cc_len = (n - 10).min(2);
            let (cc, rest) = digits.split_at(cc_len);
            format!("+{cc} {}", hyphenate(rest))
        }
    }
}

/// `9876543210` → `987-654-3210`; longer tails keep the extra digits in the
/// final group.
fn hyphenate(digits: &str) -> String {
    if digits.len() <= 6 {
        return digits.to_owned();
    }
    format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
}
