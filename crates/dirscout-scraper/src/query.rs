//! Free-text query interpretation.
//!
//! Splits a raw query like `"hotels in bombay"` into a business category
//! and an optional location, correcting common typos and resolving city
//! aliases to their canonical (post-renaming) names. This is a best-effort
//! heuristic over two fixed lookup tables, not a general parser — tests pin
//! specific literal mappings.

use dirscout_core::SearchQuery;

/// Word-by-word spelling corrections applied to category tokens.
const SPELLING_CORRECTIONS: &[(&str, &str)] = &[
    ("restaurents", "restaurants"),
    ("resturants", "restaurants"),
    ("restraunts", "restaurants"),
    ("appartments", "apartments"),
    ("appartment", "apartment"),
    ("hotells", "hotels"),
    ("accomodation", "accommodation"),
    ("acommodation", "accommodation"),
    ("buisness", "business"),
    ("bussiness", "business"),
    ("docter", "doctor"),
    ("docteur", "doctor"),
    ("enginear", "engineer"),
    ("enginer", "engineer"),
];

/// City alias table: historical names, abbreviations, and common spellings
/// mapped to the canonical city name. Canonical names map to themselves so a
/// plain city token is still recognized as a location.
const CITY_ALIASES: &[(&str, &str)] = &[
    ("mumbai", "mumbai"),
    ("bombay", "mumbai"),
    ("delhi", "delhi"),
    ("bengaluru", "bengaluru"),
    ("bangalore", "bengaluru"),
    ("banglore", "bengaluru"),
    ("blore", "bengaluru"),
    ("blr", "bengaluru"),
    ("hyderabad", "hyderabad"),
    ("hyd", "hyderabad"),
    ("secunderabad", "hyderabad"),
    ("chennai", "chennai"),
    ("madras", "chennai"),
    ("kolkata", "kolkata"),
    ("calcutta", "kolkata"),
    ("pune", "pune"),
    ("poona", "pune"),
    ("ahmedabad", "ahmedabad"),
    ("ahmadabad", "ahmedabad"),
    ("amdavad", "ahmedabad"),
    ("surat", "surat"),
    ("jaipur", "jaipur"),
    ("vadodara", "vadodara"),
    ("baroda", "vadodara"),
    ("vadodra", "vadodara"),
    ("mysuru", "mysuru"),
    ("mysore", "mysuru"),
    ("kochi", "kochi"),
    ("cochin", "kochi"),
    ("thrissur", "thrissur"),
    ("trichur", "thrissur"),
    ("thiruvananthapuram", "thiruvananthapuram"),
    ("trivandrum", "thiruvananthapuram"),
    ("mangaluru", "mangaluru"),
    ("mangalore", "mangaluru"),
    ("shimla", "shimla"),
    ("simla", "shimla"),
    ("guwahati", "guwahati"),
    ("gauhati", "guwahati"),
    ("hubballi", "hubballi"),
    ("hubli", "hubballi"),
    ("prayagraj", "prayagraj"),
    ("allahabad", "prayagraj"),
    ("varanasi", "varanasi"),
    ("benares", "varanasi"),
    ("benaras", "varanasi"),
    ("visakhapatnam", "visakhapatnam"),
    ("vizag", "visakhapatnam"),
];

/// Parses a raw free-text query into `(category, location)`.
///
/// Algorithm:
/// 1. Tokenize on whitespace, lowercased.
/// 2. When an `in` token is present, everything before it is the category
///    and everything after is the location phrase; the first token of the
///    phrase that matches a city alias resolves to the canonical name,
///    otherwise the raw phrase is kept as-is (title-cased).
/// 3. Without `in`, the first token matching a city alias becomes the
///    location and the remaining tokens the category.
/// 4. Category tokens go through the spelling-correction table and are
///    title-cased word by word.
///
/// An empty query yields an empty category; callers must reject that.
#[must_use]
pub fn interpret(raw_query: &str) -> SearchQuery {
    let lowered = raw_query.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let (category_tokens, location) = match tokens.iter().position(|t| *t == "in") {
        Some(split) => {
            let location_tokens = &tokens[split + 1..];
            let resolved = location_tokens
                .iter()
                .find_map(|t| resolve_city(t))
                .map(str::to_owned)
                .or_else(|| {
                    if location_tokens.is_empty() {
                        None
                    } else {
                        Some(location_tokens.join(" "))
                    }
                });
            (tokens[..split].to_vec(), resolved)
        }
        None => match tokens
            .iter()
            .enumerate()
            .find_map(|(i, t)| resolve_city(t).map(|city| (i, city)))
        {
            Some((city_index, city)) => {
                let mut rest = tokens.clone();
                rest.remove(city_index);
                (rest, Some(city.to_owned()))
            }
            // No "in" and no known city token: the whole query is the category.
            None => (tokens, None),
        },
    };

    let category = category_tokens
        .iter()
        .map(|t| title_case(correct_spelling(t)))
        .collect::<Vec<_>>()
        .join(" ");

    SearchQuery {
        category,
        location: location.map(|l| {
            l.split_whitespace()
                .map(title_case)
                .collect::<Vec<_>>()
                .join(" ")
        }),
    }
}

fn resolve_city(token: &str) -> Option<&'static str> {
    CITY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, canonical)| *canonical)
}

fn correct_spelling(word: &str) -> &str {
    SPELLING_CORRECTIONS
        .iter()
        .find(|(wrong, _)| *wrong == word)
        .map_or(word, |(_, right)| *right)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
