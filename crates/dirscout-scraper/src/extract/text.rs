//! Small text helpers shared by the field extractors.

use scraper::ElementRef;

/// Full text content of an element, whitespace-collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Trims and collapses runs of whitespace (including newlines and tabs)
/// into single spaces.
#[must_use]
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First decimal number (e.g. `4.5` out of `"4.5 stars"`), if any.
pub(crate) fn first_decimal(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let mut end = start;
    let mut seen_dot = false;
    while end < bytes.len() {
        let c = bytes[end] as char;
        if c.is_ascii_digit() {
            end += 1;
        } else if c == '.' && !seen_dot && end + 1 < bytes.len() && bytes[end + 1].is_ascii_digit()
        {
            seen_dot = true;
            end += 1;
        } else {
            break;
        }
    }
    text[start..end].parse().ok()
}

/// First run of digits parsed as an integer, ignoring thousands separators,
/// so `"1,234 reviews"` yields `1234`.
pub(crate) fn first_integer(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
