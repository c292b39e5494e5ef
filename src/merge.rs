// 🔗 Merger - Folds this run's novel records into the snapshot
// Existing records are never modified; novel records get first_seen = today

use crate::extract::{normalize_date, ExtractedEntry};
use crate::novelty::NoveltyFilter;
use crate::record::{FundRecord, Snapshot};
use chrono::NaiveDate;

/// Run extracted entries through the novelty filter and build the records
/// to append. Entries are processed in document order; every accepted entry
/// becomes a record with a normalized date and `first_seen = today`.
pub fn collect_novel(
    entries: &[ExtractedEntry],
    filter: &mut NoveltyFilter,
    today: NaiveDate,
) -> Vec<FundRecord> {
    let mut novel = Vec::new();

    for entry in entries {
        if filter.accept(&entry.name) {
            novel.push(FundRecord::new(
                entry.name.clone(),
                normalize_date(&entry.raw_date),
                today,
            ));
        }
    }

    novel
}

/// Append novel records to the snapshot and re-sort descending by
/// authorization date, unparseable dates last. Existing records keep their
/// original `first_seen`.
pub fn merge_into(snapshot: &mut Snapshot, novel: &[FundRecord]) {
    for record in novel {
        snapshot.push(record.clone());
    }

    snapshot.sort_by_auth_date_desc();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, raw_date: &str) -> ExtractedEntry {
        ExtractedEntry {
            name: name.to_string(),
            raw_date: raw_date.to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_collect_novel_tags_first_seen() {
        let mut filter = NoveltyFilter::new(&Snapshot::new());
        let entries = vec![entry("Acme Growth Fund", "01 Mar 2024")];

        let novel = collect_novel(&entries, &mut filter, today());

        assert_eq!(novel.len(), 1);
        assert_eq!(novel[0].name, "Acme Growth Fund");
        assert_eq!(novel[0].auth_date, "2024-03-01");
        assert_eq!(novel[0].first_seen, today());
    }

    #[test]
    fn test_collect_novel_skips_known_names() {
        let existing = Snapshot::from_records(vec![FundRecord::new(
            "Acme Growth Fund".to_string(),
            "2021-01-01".to_string(),
            NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(),
        )]);
        let mut filter = NoveltyFilter::new(&existing);

        let entries = vec![
            entry("Acme Growth Fund", "01 Mar 2024"),
            entry("Beta Income Fund", "02 Mar 2024"),
        ];
        let novel = collect_novel(&entries, &mut filter, today());

        assert_eq!(novel.len(), 1);
        assert_eq!(novel[0].name, "Beta Income Fund");
    }

    #[test]
    fn test_collect_novel_keeps_raw_date_on_normalization_miss() {
        let mut filter = NoveltyFilter::new(&Snapshot::new());
        let entries = vec![entry("Odd Fund", "32-Xyz-99")];

        let novel = collect_novel(&entries, &mut filter, today());

        assert_eq!(novel[0].auth_date, "32-Xyz-99");
    }

    #[test]
    fn test_merge_preserves_existing_first_seen() {
        let original_first_seen = NaiveDate::from_ymd_opt(2021, 2, 1).unwrap();
        let mut snapshot = Snapshot::from_records(vec![FundRecord::new(
            "Old Fund".to_string(),
            "2021-01-01".to_string(),
            original_first_seen,
        )]);

        let novel = vec![FundRecord::new(
            "New Fund".to_string(),
            "2024-03-01".to_string(),
            today(),
        )];
        merge_into(&mut snapshot, &novel);

        let old = snapshot
            .records()
            .iter()
            .find(|r| r.name == "Old Fund")
            .unwrap();
        assert_eq!(old.first_seen, original_first_seen);
    }

    #[test]
    fn test_merge_sorts_descending_unparseable_last() {
        let mut snapshot = Snapshot::from_records(vec![FundRecord::new(
            "Mid Fund".to_string(),
            "2022-01-01".to_string(),
            today(),
        )]);

        let novel = vec![
            FundRecord::new("Raw Fund".to_string(), "32-Xyz-99".to_string(), today()),
            FundRecord::new("New Fund".to_string(), "2023-05-01".to_string(), today()),
        ];
        merge_into(&mut snapshot, &novel);

        let names: Vec<&str> = snapshot.names().collect();
        assert_eq!(names, vec!["New Fund", "Mid Fund", "Raw Fund"]);
    }
}
