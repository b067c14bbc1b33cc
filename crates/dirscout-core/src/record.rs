//! Canonical output types shared by the scraper pipeline and the exporters.

use serde::{Deserialize, Serialize};

/// Preferred spreadsheet column ordering for exported records.
///
/// Fields not listed here (none today, but adapters may grow extras) are
/// appended alphabetically by the aggregator's column-order helper.
pub const PREFERRED_COLUMNS: &[&str] = &[
    "Name",
    "Phone",
    "Email",
    "Website",
    "Address",
    "Rating",
    "Reviews Count",
    "Categories",
    "Description",
    "Owner Name",
    "Social Links",
    "Source",
];

/// A parsed search query: business category plus an optional location.
///
/// Derived once from raw user input by the query interpreter and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Title-cased business category, e.g. `"Hotels"`.
    pub category: String,
    /// Canonical city name when one was recognized, else the raw location
    /// phrase; `None` when the query carried no location at all.
    pub location: Option<String>,
}

/// One business listing as extracted from a directory site.
///
/// Every field except `name` and `source` is optional: directory markup is
/// inconsistent and extraction is best-effort. A record with an empty or
/// whitespace-only name is discarded before aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub name: String,
    /// One or more phone numbers, joined with `" / "` when multiple.
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    /// One or more address blocks, joined with `" | "` when a listing
    /// legitimately exposes more than one.
    pub address: Option<String>,
    /// Star rating in `0.0..=5.0`. `None` means "unknown", which is
    /// deliberately distinct from a zero rating.
    pub rating: Option<f64>,
    pub reviews_count: Option<u32>,
    pub categories: Option<String>,
    pub description: Option<String>,
    pub owner_name: Option<String>,
    /// Comma-joined social profile URLs.
    pub social_links: Option<String>,
    /// Name of the source adapter that produced this record.
    pub source: String,
}

impl BusinessRecord {
    /// Returns `(column name, value)` pairs for every field, in
    /// [`PREFERRED_COLUMNS`] order. Unset fields yield `None`.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("Name", Some(self.name.clone())),
            ("Phone", self.phone.clone()),
            ("Email", self.email.clone()),
            ("Website", self.website.clone()),
            ("Address", self.address.clone()),
            ("Rating", self.rating.map(|r| format!("{r}"))),
            ("Reviews Count", self.reviews_count.map(|c| c.to_string())),
            ("Categories", self.categories.clone()),
            ("Description", self.description.clone()),
            ("Owner Name", self.owner_name.clone()),
            ("Social Links", self.social_links.clone()),
            ("Source", Some(self.source.clone())),
        ]
    }

    /// Looks up a single field value by its column name.
    #[must_use]
    pub fn field(&self, column: &str) -> Option<String> {
        self.fields()
            .into_iter()
            .find(|(name, _)| *name == column)
            .and_then(|(_, value)| value)
    }

    /// True when the record would survive the name invariant.
    #[must_use]
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_follow_preferred_column_order() {
        let record = BusinessRecord {
            name: "Cafe Leopold".to_owned(),
            source: "justdial".to_owned(),
            ..BusinessRecord::default()
        };
        let names: Vec<&str> = record.fields().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, PREFERRED_COLUMNS);
    }

    #[test]
    fn field_lookup_returns_set_values_only() {
        let record = BusinessRecord {
            name: "Cafe Leopold".to_owned(),
            phone: Some("+91 987-654-3210".to_owned()),
            source: "justdial".to_owned(),
            ..BusinessRecord::default()
        };
        assert_eq!(record.field("Phone").as_deref(), Some("+91 987-654-3210"));
        assert_eq!(record.field("Email"), None);
        assert_eq!(record.field("NoSuchColumn"), None);
    }

    #[test]
    fn whitespace_only_name_fails_the_name_invariant() {
        let record = BusinessRecord {
            name: "   \t".to_owned(),
            ..BusinessRecord::default()
        };
        assert!(!record.has_name());
    }
}
