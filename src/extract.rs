// 🔎 Record Extractor - Line-oriented scan of the listing document
// Pattern matching is best-effort per line: no match, no record, no error

use regex::Regex;
use thiserror::Error;

// ============================================================================
// PAGE TEXT SOURCE
// ============================================================================

/// Document-level text extraction failure. Fatal for the run: the snapshot
/// and reports are never touched when the document cannot be read.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to extract page text from document: {0}")]
    Document(String),
}

/// Turns raw document bytes into one text blob per page, in document order.
/// The extractor only needs lines, so the exact page layout handling stays
/// behind this seam (tests feed canned text instead of real documents).
pub trait PageTextSource {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError>;
}

/// Production source: per-page text from a PDF document.
pub struct PdfPageSource;

impl PageTextSource for PdfPageSource {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ExtractError::Document(e.to_string()))
    }
}

// ============================================================================
// LINE SCANNING
// ============================================================================

/// A (name, raw date) pair lifted from one line of the document, before
/// novelty filtering. The date is still in source form here.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEntry {
    pub name: String,
    pub raw_date: String,
}

/// Scans page text for fund-name/authorization-date lines.
///
/// A line yields an entry when it contains a date shaped like
/// `1-2 digits, space or hyphen, 3-letter month, space or hyphen, 2 or 4
/// digit year`. The name is everything before the first such match,
/// whitespace-collapsed; lines whose name portion collapses to nothing are
/// skipped (date-only rows, page furniture).
pub struct RecordExtractor {
    date_re: Regex,
}

impl RecordExtractor {
    pub fn new() -> Self {
        let date_re = Regex::new(
            r"\d{1,2}[- ](?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[- ]\d{2,4}",
        )
        .expect("date pattern compiles");

        RecordExtractor { date_re }
    }

    /// Extract entries from every page, in document order.
    pub fn extract(&self, pages: &[String]) -> Vec<ExtractedEntry> {
        let mut entries = Vec::new();

        for page in pages {
            for line in page.lines() {
                if let Some(entry) = self.scan_line(line) {
                    entries.push(entry);
                }
            }
        }

        entries
    }

    /// One line, one candidate at most. Soft miss on anything unexpected.
    fn scan_line(&self, line: &str) -> Option<ExtractedEntry> {
        let m = self.date_re.find(line)?;

        let name = collapse_whitespace(&line[..m.start()]);
        if name.is_empty() {
            return None;
        }

        Some(ExtractedEntry {
            name,
            raw_date: m.as_str().trim().to_string(),
        })
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// DATE NORMALIZATION
// ============================================================================

/// Accepted source date formats, tried in order. First success wins.
const DATE_FORMATS: [&str; 3] = ["%d %b %Y", "%d-%b-%y", "%d %B %Y"];

/// Normalize a raw date to canonical YYYY-MM-DD.
///
/// Each accepted format is a fallible parse attempt; the first one that
/// succeeds is reformatted. A miss on every format is not an error: the raw
/// trimmed string passes through unchanged and the record keeps it.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| chrono::NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
