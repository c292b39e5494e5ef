// 📊 Report Generator - Derived views over the merged snapshot
// Full database, this run's delta, the ETF subset, and the HTML digest

use crate::record::{FundRecord, Snapshot};
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tracing::info;

pub const FULL_REPORT_FILE: &str = "Full_Database.xlsx";
pub const DELTA_REPORT_FILE: &str = "New_Funds.xlsx";
pub const ETF_REPORT_FILE: &str = "All_ETFs.xlsx";
pub const DIGEST_FILE: &str = "email_body.html";

/// How far back the HTML digest looks for recent ETF listings.
const DIGEST_WINDOW_DAYS: u64 = 90;

const COLUMNS: [&str; 3] = ["Fund Name", "Auth_Date", "First_Seen"];

// ============================================================================
// VIEWS
// ============================================================================

/// Records whose name contains "ETF", case-insensitive. Snapshot order is
/// preserved.
pub fn etf_view(snapshot: &Snapshot) -> Vec<&FundRecord> {
    snapshot.records().iter().filter(|r| r.is_etf()).collect()
}

/// ETF records authorized within the digest window. Records whose date never
/// normalized cannot be placed in time and are excluded here.
pub fn recent_etfs<'a>(etfs: &[&'a FundRecord], today: NaiveDate) -> Vec<&'a FundRecord> {
    let cutoff = today - Days::new(DIGEST_WINDOW_DAYS);

    etfs.iter()
        .filter(|r| r.auth_date_parsed().is_some_and(|d| d >= cutoff))
        .copied()
        .collect()
}

// ============================================================================
// REPORT WRITER
// ============================================================================

/// Writes the spreadsheet reports and the HTML digest into one directory,
/// overwriting previous runs' files.
pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        ReportWriter {
            out_dir: out_dir.into(),
        }
    }

    /// Emit all derived outputs. The delta report is only written when this
    /// run actually found novel records; the other files are unconditional.
    pub fn write_all(
        &self,
        snapshot: &Snapshot,
        delta: &[FundRecord],
        today: NaiveDate,
    ) -> Result<()> {
        let full: Vec<&FundRecord> = snapshot.records().iter().collect();
        self.write_workbook(FULL_REPORT_FILE, &full)?;

        if !delta.is_empty() {
            let delta_refs: Vec<&FundRecord> = delta.iter().collect();
            self.write_workbook(DELTA_REPORT_FILE, &delta_refs)?;
        }

        let etfs = etf_view(snapshot);
        self.write_workbook(ETF_REPORT_FILE, &etfs)?;

        let digest = render_digest(&recent_etfs(&etfs, today));
        let digest_path = self.out_dir.join(DIGEST_FILE);
        std::fs::write(&digest_path, digest)
            .with_context(|| format!("failed to write {}", digest_path.display()))?;

        info!(
            full = full.len(),
            delta = delta.len(),
            etfs = etfs.len(),
            "reports written"
        );
        Ok(())
    }

    fn write_workbook(&self, file_name: &str, records: &[&FundRecord]) -> Result<()> {
        let path = self.out_dir.join(file_name);
        write_records_workbook(&path, records)
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

/// One sheet, fixed column order, header row then one row per record.
fn write_records_workbook(path: &Path, records: &[&FundRecord]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, record.name.as_str())?;
        worksheet.write_string(row, 1, record.auth_date.as_str())?;
        worksheet.write_string(row, 2, record.first_seen.format("%Y-%m-%d").to_string())?;
    }

    workbook.save(path)?;
    Ok(())
}

// ============================================================================
// HTML DIGEST
// ============================================================================

/// Small HTML body listing recent ETF listings, for pasting into a mail.
/// Two columns only; First_Seen is pipeline bookkeeping, not digest content.
pub fn render_digest(recent: &[&FundRecord]) -> String {
    let mut body = String::from("<h3>Recent ETF Listings (Last 3 Months)</h3>");

    if recent.is_empty() {
        body.push_str("<p>No new ETFs identified in the last 90 days.</p>");
        return body;
    }

    body.push_str("<table border=\"1\"><thead><tr><th>Fund Name</th><th>Auth_Date</th></tr></thead><tbody>");
    for record in recent {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            record.name, record.auth_date
        ));
    }
    body.push_str("</tbody></table>");

    body
}
