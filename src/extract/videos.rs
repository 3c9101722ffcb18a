use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::VideoEntry;

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static IFRAME_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("iframe[src]").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

const VIDEO_HOSTS: &[&str] = &["youtube.com/watch", "youtu.be/", "vimeo.com/"];
const EMBED_HOSTS: &[&str] = &[
    "youtube.com/embed/",
    "youtube-nocookie.com/embed/",
    "player.vimeo.com/video/",
];

/// Collect titled video links from an auxiliary page: anchors pointing
/// at a video host, plus iframe embeds titled via their `title`
/// attribute. Entries without a usable title are dropped; URLs are
/// unique within the result.
pub fn extract(html: &str, base: &Url) -> Vec<VideoEntry> {
    let doc = Html::parse_document(html);
    let mut seen: HashSet<String> = HashSet::new();
    let mut videos: Vec<VideoEntry> = Vec::new();

    for link in doc.select(&ANCHOR_SEL) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !VIDEO_HOSTS.iter().any(|h| href.contains(h)) {
            continue;
        }
        let Ok(abs) = base.join(href) else { continue };
        if !seen.insert(abs.to_string()) {
            continue;
        }
        if let Some(title) = anchor_title(&link) {
            videos.push(VideoEntry {
                title,
                url: abs.to_string(),
            });
        }
    }

    for frame in doc.select(&IFRAME_SEL) {
        let Some(src) = frame.value().attr("src") else {
            continue;
        };
        if !EMBED_HOSTS.iter().any(|h| src.contains(h)) {
            continue;
        }
        let Ok(abs) = base.join(src) else { continue };
        if !seen.insert(abs.to_string()) {
            continue;
        }
        let title = frame
            .value()
            .attr("title")
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(title) = title {
            videos.push(VideoEntry {
                title: title.to_string(),
                url: abs.to_string(),
            });
        }
    }

    videos
}

/// Anchor title: link text, else inner image alt, else the anchor's
/// title / aria-label attributes.
fn anchor_title(link: &ElementRef) -> Option<String> {
    let text: String = link.text().collect();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !text.is_empty() {
        return Some(text);
    }
    if let Some(alt) = link
        .select(&IMG_SEL)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(alt.to_string());
    }
    link.value()
        .attr("title")
        .or_else(|| link.value().attr("aria-label"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://nudel.example/pages/videos").unwrap()
    }

    #[test]
    fn anchor_with_text() {
        let html = r#"<a href="https://www.youtube.com/watch?v=abc123">Level 2 - Build a Cube</a>"#;
        let videos = extract(html, &base());
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].title, "Level 2 - Build a Cube");
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn anchor_title_from_image_alt() {
        let html = r#"<a href="https://youtu.be/xyz"><img alt="Tower walkthrough"></a>"#;
        let videos = extract(html, &base());
        assert_eq!(videos[0].title, "Tower walkthrough");
    }

    #[test]
    fn anchor_title_from_attributes() {
        let html = r#"<a href="https://vimeo.com/12345" aria-label="Seesaw assembly"></a>"#;
        let videos = extract(html, &base());
        assert_eq!(videos[0].title, "Seesaw assembly");
    }

    #[test]
    fn untitled_anchor_dropped() {
        let html = r#"<a href="https://youtu.be/xyz"></a>"#;
        let videos = extract(html, &base());
        assert!(videos.is_empty());
    }

    #[test]
    fn iframe_embed_with_title() {
        let html = r#"<iframe src="https://www.youtube.com/embed/abc" title="Level 3 - Bridge"></iframe>"#;
        let videos = extract(html, &base());
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].title, "Level 3 - Bridge");
        assert_eq!(videos[0].url, "https://www.youtube.com/embed/abc");
    }

    #[test]
    fn untitled_iframe_dropped() {
        let html = r#"<iframe src="https://www.youtube.com/embed/abc"></iframe>"#;
        let videos = extract(html, &base());
        assert!(videos.is_empty());
    }

    #[test]
    fn dedupes_by_url() {
        let html = r#"
            <a href="https://youtu.be/xyz">Cube video</a>
            <a href="https://youtu.be/xyz">Cube video (mirror)</a>
        "#;
        let videos = extract(html, &base());
        assert_eq!(videos.len(), 1);
    }

    #[test]
    fn ignores_ordinary_links() {
        let html = r#"<a href="/pages/about">About us</a>"#;
        let videos = extract(html, &base());
        assert!(videos.is_empty());
    }
}
