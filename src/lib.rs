// Fund Registry Sync - Core Library
// Tracks a regulator's authorized fund list against a local shadow database

pub mod extract;
pub mod fetch;
pub mod merge;
pub mod novelty;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod store;

// Re-export commonly used types
pub use extract::{
    collapse_whitespace, normalize_date, ExtractError, ExtractedEntry, PageTextSource,
    PdfPageSource, RecordExtractor,
};
pub use fetch::{DocumentFetcher, FetchError, FileFetcher, PortalFetcher};
pub use merge::{collect_novel, merge_into};
pub use novelty::NoveltyFilter;
pub use pipeline::{run_sync, SyncOutcome};
pub use record::{FundRecord, Snapshot};
pub use report::{etf_view, ReportWriter};
pub use store::{CsvSnapshotStore, MemorySnapshotStore, SnapshotStore, StorageError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
