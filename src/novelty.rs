// 🔍 Novelty Filter - Decides which extracted entries are new funds
// Exact name match against the snapshot as it stood at run start

use crate::record::Snapshot;
use std::collections::HashSet;

/// Decides whether an extracted entry is novel relative to the snapshot
/// taken at run start.
///
/// A candidate is novel iff no known record's name exactly equals its
/// normalized name: case-sensitive, whitespace-collapsed, no fuzzy or
/// substring matching. Duplicate names appearing twice within the same
/// incoming document are also collapsed - the first occurrence is accepted
/// and later ones rejected, so one document can never introduce two records
/// with the same name.
pub struct NoveltyFilter {
    seen: HashSet<String>,
}

impl NoveltyFilter {
    /// Seed the check set from the snapshot at run start.
    pub fn new(snapshot: &Snapshot) -> Self {
        NoveltyFilter {
            seen: snapshot.names().map(|n| n.to_string()).collect(),
        }
    }

    /// Accept a candidate name, claiming it for this run. Returns true when
    /// the name was unseen, false when it duplicates a known record or an
    /// earlier candidate from the same document.
    pub fn accept(&mut self, name: &str) -> bool {
        self.seen.insert(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FundRecord;
    use chrono::NaiveDate;

    fn snapshot_with(names: &[&str]) -> Snapshot {
        Snapshot::from_records(
            names
                .iter()
                .map(|n| {
                    FundRecord::new(
                        n.to_string(),
                        "2023-01-01".to_string(),
                        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_known_name_rejected_regardless_of_date() {
        let mut filter = NoveltyFilter::new(&snapshot_with(&["Acme Growth Fund"]));

        assert!(!filter.accept("Acme Growth Fund"));
    }

    #[test]
    fn test_unknown_name_accepted() {
        let mut filter = NoveltyFilter::new(&snapshot_with(&["Acme Growth Fund"]));

        assert!(filter.accept("Beta Income Fund"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let mut filter = NoveltyFilter::new(&snapshot_with(&["Acme Growth Fund"]));

        assert!(filter.accept("ACME GROWTH FUND"));
    }

    #[test]
    fn test_match_is_not_substring() {
        let mut filter = NoveltyFilter::new(&snapshot_with(&["Acme Growth Fund"]));

        assert!(filter.accept("Acme Growth"));
    }

    #[test]
    fn test_within_run_duplicates_collapse() {
        let mut filter = NoveltyFilter::new(&Snapshot::new());

        assert!(filter.accept("Beta Income Fund"));
        assert!(!filter.accept("Beta Income Fund"));
    }
}
