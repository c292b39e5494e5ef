// 🔄 Sync Pipeline - One linear pass: load, fetch, extract, merge, persist
// Collaborators are injected so the whole run is testable without a portal

use crate::extract::{PageTextSource, RecordExtractor};
use crate::fetch::DocumentFetcher;
use crate::merge::{collect_novel, merge_into};
use crate::novelty::NoveltyFilter;
use crate::record::FundRecord;
use crate::report::{etf_view, ReportWriter};
use crate::store::SnapshotStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

/// Counters from one completed run, for the caller's summary output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Records in the snapshot at run start.
    pub known_at_start: usize,
    /// Novel records found this run (the delta view).
    pub novel_found: usize,
    /// Records in the snapshot after the merge.
    pub total_after: usize,
    /// ETF records in the merged snapshot.
    pub etf_count: usize,
}

/// Run the full sync once. Strictly linear; a failure at any step aborts the
/// run, and nothing is written before extraction has succeeded. The snapshot
/// is persisted before the reports so the baseline for the next run never
/// depends on report output succeeding.
pub fn run_sync(
    fetcher: &dyn DocumentFetcher,
    pages: &dyn PageTextSource,
    store: &dyn SnapshotStore,
    reports: &ReportWriter,
    today: NaiveDate,
) -> Result<SyncOutcome> {
    let mut snapshot = store.load().context("failed to load snapshot")?;
    let known_at_start = snapshot.len();
    info!(known = known_at_start, "snapshot loaded");

    let bytes = fetcher
        .fetch_listing_document()
        .context("failed to fetch listing document")?;

    let page_texts = pages
        .page_texts(&bytes)
        .context("failed to extract document text")?;

    let entries = RecordExtractor::new().extract(&page_texts);
    info!(
        pages = page_texts.len(),
        entries = entries.len(),
        "document scanned"
    );

    let mut filter = NoveltyFilter::new(&snapshot);
    let novel: Vec<FundRecord> = collect_novel(&entries, &mut filter, today);
    info!(novel = novel.len(), "novelty filter applied");

    merge_into(&mut snapshot, &novel);
    store.save(&snapshot).context("failed to save snapshot")?;

    reports
        .write_all(&snapshot, &novel, today)
        .context("failed to write reports")?;

    Ok(SyncOutcome {
        known_at_start,
        novel_found: novel.len(),
        total_after: snapshot.len(),
        etf_count: etf_view(&snapshot).len(),
    })
}
