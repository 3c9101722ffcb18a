use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const TIMEOUT_SECS: u64 = 30;

/// Shared HTTP client: browser user-agent, fixed request timeout.
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()
        .context("failed to build HTTP client")
}

pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

/// Outcome of a download against an existing output tree.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Downloaded(u64),
    AlreadyExists,
}

/// Fetch a binary asset to `dest`, skipping files from earlier runs.
pub async fn download_file(client: &Client, url: &str, dest: &Path) -> Result<Outcome> {
    if dest.exists() {
        return Ok(Outcome::AlreadyExists);
    }
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    std::fs::write(dest, &bytes).with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(Outcome::Downloaded(bytes.len() as u64))
}

/// Like download_file, but refuses payloads that are not PDFs.
pub async fn download_pdf(client: &Client, url: &str, dest: &Path) -> Result<Outcome> {
    if dest.exists() {
        return Ok(Outcome::AlreadyExists);
    }
    let resp = client.get(url).send().await?.error_for_status()?;
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());
    let bytes = resp.bytes().await?;
    if !is_pdf_payload(content_type.as_deref(), url, &bytes) {
        bail!(
            "{} does not look like a PDF (content-type: {})",
            url,
            content_type.as_deref().unwrap_or("unknown")
        );
    }
    std::fs::write(dest, &bytes).with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(Outcome::Downloaded(bytes.len() as u64))
}

/// Accept when the content-type mentions pdf, the URL ends in .pdf, or
/// the body carries the %PDF magic.
fn is_pdf_payload(content_type: Option<&str>, url: &str, body: &[u8]) -> bool {
    if content_type.is_some_and(|ct| ct.contains("pdf")) {
        return true;
    }
    if url.to_lowercase().ends_with(".pdf") {
        return true;
    }
    body.starts_with(b"%PDF")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_by_content_type() {
        assert!(is_pdf_payload(Some("application/pdf"), "https://x/doc", b"junk"));
    }

    #[test]
    fn pdf_by_url_extension() {
        assert!(is_pdf_payload(Some("text/html"), "https://x/doc.PDF", b"junk"));
    }

    #[test]
    fn pdf_by_magic_bytes() {
        assert!(is_pdf_payload(None, "https://x/doc", b"%PDF-1.7 ..."));
    }

    #[test]
    fn html_error_page_rejected() {
        assert!(!is_pdf_payload(Some("text/html"), "https://x/doc", b"<html>not found</html>"));
    }
}
