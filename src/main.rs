use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use fund_registry_sync::{
    pipeline::run_sync, CsvSnapshotStore, DocumentFetcher, FileFetcher, PdfPageSource,
    PortalFetcher, ReportWriter,
};

const DEFAULT_PORTAL_URL: &str = "https://registers.centralbank.ie/DownloadsPage.aspx";
const DEFAULT_TARGET_TEXT: &str = "Authorised UCITS, European Communities (Undertakings for Collective Investment in Transferable Securities) Regulations 2011";

#[derive(Parser)]
#[command(name = "fund-registry-sync")]
#[command(version = fund_registry_sync::VERSION)]
#[command(about = "Sync the regulator's authorized fund list against a local shadow database")]
struct Cli {
    /// Path to the snapshot CSV (created on first run)
    #[arg(long, default_value = "fund_shadow_db.csv")]
    snapshot: PathBuf,

    /// Directory for the spreadsheet reports and HTML digest
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Downloads page of the registry portal
    #[arg(long, default_value = DEFAULT_PORTAL_URL)]
    portal_url: String,

    /// Link text identifying the listing document on the downloads page
    #[arg(long, default_value = DEFAULT_TARGET_TEXT)]
    target_text: String,

    /// Read a pre-downloaded listing PDF instead of hitting the portal
    #[arg(long)]
    from_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("fund_registry_sync=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("fund_registry_sync=info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let fetcher: Box<dyn DocumentFetcher> = match &cli.from_file {
        Some(path) => Box::new(FileFetcher::new(path)),
        None => Box::new(PortalFetcher::new(
            cli.portal_url.clone(),
            cli.target_text.clone(),
        )?),
    };

    let store = CsvSnapshotStore::new(&cli.snapshot);
    let reports = ReportWriter::new(&cli.out_dir);
    let today = Local::now().date_naive();

    let outcome = run_sync(fetcher.as_ref(), &PdfPageSource, &store, &reports, today)?;

    println!("✓ Snapshot: {} known at start", outcome.known_at_start);
    println!("✓ New funds this run: {}", outcome.novel_found);
    println!(
        "✓ Shadow database now holds {} funds ({} ETFs)",
        outcome.total_after, outcome.etf_count
    );
    println!("✓ Reports written to {}", cli.out_dir.display());

    Ok(())
}
