//! Cross-source aggregation and deduplication.
//!
//! Runs once per session after every source walk completes. Field values
//! are whitespace-normalized before comparison so formatting noise cannot
//! defeat matching, and the dedup key adapts to the data: always the name,
//! extended with phone and address when any record carries them.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use dirscout_core::{BusinessRecord, PREFERRED_COLUMNS};

use crate::extract::text::collapse_whitespace;

/// Fields considered for the dedup identity, in priority order.
const IDENTITY_FIELDS: &[&str] = &["Name", "Phone", "Address"];

/// Deduplicates `records`, keeping the first-seen record for each identity.
///
/// Every field is trimmed and internal whitespace collapsed before
/// comparison and in the output. Applying this twice yields the same
/// result as applying it once.
#[must_use]
pub fn aggregate(records: Vec<BusinessRecord>) -> Vec<BusinessRecord> {
    let cleaned: Vec<BusinessRecord> = records.into_iter().map(clean_record).collect();
    let key_fields = identity_fields(&cleaned);

    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();
    for record in cleaned {
        let key = dedup_key(&record, &key_fields);
        if seen.insert(key) {
            kept.push(record);
        }
    }
    kept
}

/// Identity fields actually usable for this record set: the name always,
/// phone/address only when at least one record carries them.
fn identity_fields(records: &[BusinessRecord]) -> Vec<&'static str> {
    IDENTITY_FIELDS
        .iter()
        .filter(|field| {
            **field == "Name"
                || records
                    .iter()
                    .any(|r| r.field(field).is_some_and(|v| !v.is_empty()))
        })
        .copied()
        .collect()
}

/// SHA-256 over the lowercased identity field values, NUL-separated so
/// adjacent fields cannot collide by concatenation.
fn dedup_key(record: &BusinessRecord, fields: &[&'static str]) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        let value = record.field(field).unwrap_or_default().to_lowercase();
        hasher.update(value.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

fn clean_record(mut record: BusinessRecord) -> BusinessRecord {
    record.name = collapse_whitespace(&record.name);
    for field in [
        &mut record.phone,
        &mut record.email,
        &mut record.website,
        &mut record.address,
        &mut record.categories,
        &mut record.description,
        &mut record.owner_name,
        &mut record.social_links,
    ] {
        if let Some(value) = field.as_deref() {
            let cleaned = collapse_whitespace(value);
            *field = if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            };
        }
    }
    record
}

/// Output column order: the union of populated fields, preferred order
/// first, any stragglers appended alphabetically.
#[must_use]
pub fn column_order(records: &[BusinessRecord]) -> Vec<&'static str> {
    let mut present: HashSet<&'static str> = HashSet::new();
    for record in records {
        for (column, value) in record.fields() {
            if value.is_some() {
                present.insert(column);
            }
        }
    }
    let mut ordered: Vec<&'static str> = PREFERRED_COLUMNS
        .iter()
        .filter(|c| present.contains(*c))
        .copied()
        .collect();
    let mut extra: Vec<&'static str> = present
        .into_iter()
        .filter(|c| !PREFERRED_COLUMNS.contains(c))
        .collect();
    extra.sort_unstable();
    ordered.extend(extra);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, phone: Option<&str>, address: Option<&str>) -> BusinessRecord {
        BusinessRecord {
            name: name.to_owned(),
            phone: phone.map(str::to_owned),
            address: address.map(str::to_owned),
            source: "justdial".to_owned(),
            ..BusinessRecord::default()
        }
    }

    #[test]
    fn first_seen_record_wins() {
        let records = vec![
            record("Acme Cafe", Some("+91 987-654-3210"), None),
            record("Acme Cafe", Some("+91 987-654-3210"), Some("12 MG Road, Mumbai")),
        ];
        let kept = aggregate(records);
        assert_eq!(kept.len(), 1);
        // The first record carried no address; it still wins.
        assert_eq!(kept[0].address, None);
    }

    #[test]
    fn whitespace_noise_does_not_defeat_matching() {
        let records = vec![
            record("Acme  Cafe", Some("+91 987-654-3210"), None),
            record("Acme\nCafe", Some("+91  987-654-3210"), None),
        ];
        assert_eq!(aggregate(records).len(), 1);
    }

    #[test]
    fn same_name_different_phone_survives_when_phones_present() {
        let records = vec![
            record("Acme Cafe", Some("+91 987-654-3210"), None),
            record("Acme Cafe", Some("+91 876-543-2109"), None),
        ];
        assert_eq!(aggregate(records).len(), 2);
    }

    #[test]
    fn name_only_dedup_when_no_record_has_phone_or_address() {
        let records = vec![
            record("Acme Cafe", None, None),
            record("acme cafe", None, None),
        ];
        // Case-insensitive name identity collapses them.
        assert_eq!(aggregate(records).len(), 1);
    }

    #[test]
    fn aggregate_is_idempotent() {
        let records = vec![
            record("Acme Cafe", Some("+91 987-654-3210"), Some("12 MG Road")),
            record("Acme Cafe", Some("+91 987-654-3210"), Some("12 MG Road")),
            record("Binary Bakers", None, None),
        ];
        let once = aggregate(records);
        let twice = aggregate(once.clone());
        assert_eq!(once.len(), twice.len());
        assert_eq!(
            once.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
            twice.iter().map(|r| r.name.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn column_order_follows_preferred_list() {
        let records = vec![record(
            "Acme Cafe",
            Some("+91 987-654-3210"),
            Some("12 MG Road"),
        )];
        assert_eq!(
            column_order(&records),
            vec!["Name", "Phone", "Address", "Source"]
        );
    }
}
