// 📋 Fund Records - Core data model for the shadow database
// One record per authorized fund, keyed by normalized name

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single authorized fund as tracked across runs.
/// Serde renames match the snapshot CSV / report column headers exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRecord {
    /// Extracted fund name, whitespace-normalized. The identity key:
    /// no two records in a snapshot share a name.
    #[serde(rename = "Fund Name")]
    pub name: String,

    /// Authorization date, canonical YYYY-MM-DD when the source text parsed
    /// against an accepted format, otherwise the raw trimmed text.
    #[serde(rename = "Auth_Date")]
    pub auth_date: String,

    /// Date this pipeline first captured the record. Set once, never updated.
    /// Distinct from the regulatory authorization date.
    #[serde(rename = "First_Seen")]
    pub first_seen: NaiveDate,
}

impl FundRecord {
    pub fn new(name: String, auth_date: String, first_seen: NaiveDate) -> Self {
        FundRecord {
            name,
            auth_date,
            first_seen,
        }
    }

    /// Authorization date as a typed date, if it is in canonical form.
    /// Records that kept a raw unparseable date return None and sort last.
    pub fn auth_date_parsed(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.auth_date, "%Y-%m-%d").ok()
    }

    /// Case-insensitive "ETF" substring check used by the filtered view.
    pub fn is_etf(&self) -> bool {
        self.name.to_lowercase().contains("etf")
    }
}

/// The full set of previously observed fund records - the baseline for
/// novelty detection. Loaded once at run start, extended in memory, then
/// persisted wholesale. Ordering is recomputed at write time, it is not a
/// storage invariant.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<FundRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Snapshot {
            records: Vec::new(),
        }
    }

    pub fn from_records(records: Vec<FundRecord>) -> Self {
        Snapshot { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FundRecord] {
        &self.records
    }

    pub fn push(&mut self, record: FundRecord) {
        self.records.push(record);
    }

    /// Iterate record names (the novelty filter seeds its check set from this).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// Re-sort descending by authorization date. Records whose date is not in
    /// canonical form sort after every parseable date.
    pub fn sort_by_auth_date_desc(&mut self) {
        self.records
            .sort_by_cached_key(|r| std::cmp::Reverse(r.auth_date_parsed()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, auth_date: &str) -> FundRecord {
        FundRecord::new(
            name.to_string(),
            auth_date.to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_auth_date_parsed_canonical() {
        let r = record("Acme Fund", "2023-05-01");
        assert_eq!(
            r.auth_date_parsed(),
            Some(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap())
        );
    }

    #[test]
    fn test_auth_date_parsed_raw_passthrough() {
        let r = record("Acme Fund", "32-Xyz-99");
        assert_eq!(r.auth_date_parsed(), None);
    }

    #[test]
    fn test_is_etf_case_insensitive() {
        assert!(record("Global ETF Fund", "2023-01-01").is_etf());
        assert!(record("etf tracker plc", "2023-01-01").is_etf());
        assert!(!record("Bond Fund", "2023-01-01").is_etf());
    }

    #[test]
    fn test_sort_descending_unparseable_last() {
        let mut snapshot = Snapshot::from_records(vec![
            record("Old", "2022-01-01"),
            record("Raw", "32-Xyz-99"),
            record("New", "2023-05-01"),
        ]);

        snapshot.sort_by_auth_date_desc();

        let names: Vec<&str> = snapshot.names().collect();
        assert_eq!(names, vec!["New", "Old", "Raw"]);
    }
}
