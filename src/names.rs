//! Local filenames and display titles derived from asset URLs.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static UNSAFE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").unwrap());

/// Replace everything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize(name: &str) -> String {
    UNSAFE_RE.replace_all(name, "_").to_string()
}

/// Local filename for a PDF URL: path basename, falling back to the
/// last non-empty path segment and then "download.pdf", with a `.pdf`
/// extension enforced.
pub fn pdf_filename(url: &Url) -> String {
    let mut name = basename(url).unwrap_or_default();
    if name.is_empty() {
        name = "download.pdf".to_string();
    }
    if !name.to_lowercase().ends_with(".pdf") {
        name.push_str(".pdf");
    }
    sanitize(&name)
}

/// Thumbnail filename paired with a PDF: `<pdf stem>_thumb<ext>`, the
/// extension taken from the thumbnail URL path (default `.jpg`).
pub fn thumb_filename(pdf_filename: &str, thumb_url: &Url) -> String {
    let stem = pdf_filename
        .rsplit_once('.')
        .map(|(s, _)| s)
        .unwrap_or(pdf_filename);
    let ext = basename(thumb_url)
        .as_deref()
        .and_then(|b| b.rsplit_once('.').map(|(_, e)| format!(".{}", e)))
        .unwrap_or_else(|| ".jpg".to_string());
    sanitize(&format!("{}_thumb{}", stem, ext))
}

/// Display title recovered from a filename: extension stripped,
/// `_` and `-` mapped to spaces.
pub fn title_from_filename(filename: &str) -> String {
    let stem = filename
        .rsplit_once('.')
        .map(|(s, _)| s)
        .unwrap_or(filename);
    stem.replace(['_', '-'], " ").trim().to_string()
}

/// Display title recovered straight from a URL's path basename.
pub fn title_from_url(url: &Url) -> String {
    basename(url)
        .map(|b| title_from_filename(&b))
        .unwrap_or_default()
}

fn basename(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| s.to_string())
}

// ── Tests ──
