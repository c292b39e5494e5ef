// 📡 Document Fetcher - Retrieves the listing document from the portal
// ASP.NET postback dance: load the downloads page, replay its hidden form
// state, select the target item, collect the response bytes

use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport or HTTP-level failure. Fatal, no output files touched.
    #[error("portal request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The downloads page did not contain the expected form state or the
    /// link matching the configured target text.
    #[error("could not locate {0} on the downloads page")]
    TargetNotFound(String),

    /// Offline mode: the pre-downloaded document could not be read.
    #[error("failed to read document from {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Retrieval contract: whatever site-specific navigation is required,
/// resolved down to the raw document bytes.
pub trait DocumentFetcher {
    fn fetch_listing_document(&self) -> Result<Vec<u8>, FetchError>;
}

// ============================================================================
// FORM SCRAPING
// ============================================================================

/// Hidden form state plus the postback target for the selected download link.
#[derive(Debug, Clone, PartialEq)]
pub struct PostbackForm {
    pub event_target: String,
    pub view_state: String,
    pub view_state_generator: String,
    pub event_validation: String,
}

impl PostbackForm {
    /// Field pairs in the shape the portal expects back.
    pub fn to_params(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("__EVENTTARGET", self.event_target.as_str()),
            ("__EVENTARGUMENT", ""),
            ("__VIEWSTATE", self.view_state.as_str()),
            ("__VIEWSTATEGENERATOR", self.view_state_generator.as_str()),
            ("__EVENTVALIDATION", self.event_validation.as_str()),
        ]
    }
}

/// Pull a hidden input's value by element id. ASP.NET emits the id attribute
/// before value, so a single left-to-right pattern is enough.
fn hidden_field(html: &str, id: &str) -> Option<String> {
    let re = Regex::new(&format!(r#"id="{}"[^>]*value="([^"]*)""#, regex::escape(id))).ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find the download anchor whose link text contains `target_text` and pull
/// the postback target out of its `javascript:__doPostBack('...', ...)` href.
fn postback_target(html: &str, target_text: &str) -> Option<String> {
    let anchor_re = Regex::new(r#"(?s)<a[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#).ok()?;
    let quoted_re = Regex::new(r"'([^']*)'").ok()?;

    for caps in anchor_re.captures_iter(html) {
        let href = caps.get(1)?.as_str();
        let text = caps.get(2)?.as_str();

        if text.contains(target_text) {
            if let Some(target) = quoted_re.captures(href).and_then(|c| c.get(1)) {
                return Some(target.as_str().to_string());
            }
        }
    }

    None
}

/// Scrape the downloads page into a ready-to-submit postback form.
pub fn scrape_postback(html: &str, target_text: &str) -> Result<PostbackForm, FetchError> {
    let view_state = hidden_field(html, "__VIEWSTATE")
        .ok_or_else(|| FetchError::TargetNotFound("__VIEWSTATE".to_string()))?;
    let view_state_generator = hidden_field(html, "__VIEWSTATEGENERATOR")
        .ok_or_else(|| FetchError::TargetNotFound("__VIEWSTATEGENERATOR".to_string()))?;
    let event_validation = hidden_field(html, "__EVENTVALIDATION")
        .ok_or_else(|| FetchError::TargetNotFound("__EVENTVALIDATION".to_string()))?;
    let event_target = postback_target(html, target_text)
        .ok_or_else(|| FetchError::TargetNotFound(format!("link matching {:?}", target_text)))?;

    Ok(PostbackForm {
        event_target,
        view_state,
        view_state_generator,
        event_validation,
    })
}

// ============================================================================
// PORTAL FETCHER
// ============================================================================

/// Production fetcher: two requests against the registry portal's downloads
/// page, cookies carried between them.
pub struct PortalFetcher {
    client: reqwest::blocking::Client,
    page_url: String,
    target_text: String,
}

impl PortalFetcher {
    pub fn new(page_url: String, target_text: String) -> Result<Self, FetchError> {
        // The portal rejects clients without a browser user agent.
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0")
            .cookie_store(true)
            .build()?;

        Ok(PortalFetcher {
            client,
            page_url,
            target_text,
        })
    }
}

impl DocumentFetcher for PortalFetcher {
    fn fetch_listing_document(&self) -> Result<Vec<u8>, FetchError> {
        info!(url = %self.page_url, "loading downloads page");
        let html = self
            .client
            .get(&self.page_url)
            .send()?
            .error_for_status()?
            .text()?;

        let form = scrape_postback(&html, &self.target_text)?;
        debug!(event_target = %form.event_target, "submitting postback");

        let bytes = self
            .client
            .post(&self.page_url)
            .form(&form.to_params())
            .send()?
            .error_for_status()?
            .bytes()?;

        info!(bytes = bytes.len(), "retrieved listing document");
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// FILE FETCHER (offline mode)
// ============================================================================

/// Reads a pre-downloaded document from disk instead of hitting the portal.
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileFetcher { path: path.into() }
    }
}

impl DocumentFetcher for FileFetcher {
    fn fetch_listing_document(&self) -> Result<Vec<u8>, FetchError> {
        std::fs::read(&self.path).map_err(|e| FetchError::File {
            path: self.path.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body><form>
        <input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="vs123" />
        <input type="hidden" name="__VIEWSTATEGENERATOR" id="__VIEWSTATEGENERATOR" value="gen456" />
        <input type="hidden" name="__EVENTVALIDATION" id="__EVENTVALIDATION" value="ev789" />
        <a href="javascript:__doPostBack('ctl00$other','')">Some other register</a>
        <a href="javascript:__doPostBack('ctl00$funds','')">Authorised Funds Register (weekly)</a>
        </form></body></html>
    "#;

    #[test]
    fn test_scrape_postback_finds_target_link() {
        let form = scrape_postback(PAGE, "Authorised Funds Register").unwrap();

        assert_eq!(form.event_target, "ctl00$funds");
        assert_eq!(form.view_state, "vs123");
        assert_eq!(form.view_state_generator, "gen456");
        assert_eq!(form.event_validation, "ev789");
    }

    #[test]
    fn test_scrape_postback_missing_link() {
        let err = scrape_postback(PAGE, "No Such Register").unwrap_err();
        assert!(matches!(err, FetchError::TargetNotFound(_)));
    }

    #[test]
    fn test_scrape_postback_missing_form_state() {
        let err = scrape_postback("<html></html>", "anything").unwrap_err();
        assert!(matches!(err, FetchError::TargetNotFound(_)));
    }

    #[test]
    fn test_form_params_include_empty_event_argument() {
        let form = scrape_postback(PAGE, "Authorised Funds Register").unwrap();
        let params = form.to_params();

        assert!(params.contains(&("__EVENTARGUMENT", "")));
        assert!(params.contains(&("__EVENTTARGET", "ctl00$funds")));
    }

    #[test]
    fn test_file_fetcher_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listing.pdf");
        std::fs::write(&path, b"not really a pdf").unwrap();

        let bytes = FileFetcher::new(&path).fetch_listing_document().unwrap();
        assert_eq!(bytes, b"not really a pdf");
    }

    #[test]
    fn test_file_fetcher_missing_file() {
        let err = FileFetcher::new("/no/such/listing.pdf")
            .fetch_listing_document()
            .unwrap_err();
        assert!(matches!(err, FetchError::File { .. }));
    }
}
