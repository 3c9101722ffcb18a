use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::GuideLink;
use crate::names;

static PDF_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s"'<>]+\.pdf"#).unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static SCRIPT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());
static ANY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").unwrap());

const THUMB_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];
const GENERIC_TITLES: &[&str] = &["let's build it!", "download", "view", "pdf", "click here"];
const ANCESTOR_DEPTH: usize = 3;

/// Find every PDF reference on the page: anchors (with thumbnail and
/// title recovery), embed/iframe/object sources, URLs inside script
/// bodies, and finally any other attribute value. Deduped by absolute
/// URL, sorted by URL.
pub fn extract(html: &str, base: &Url) -> Vec<GuideLink> {
    let doc = Html::parse_document(html);
    let mut seen: HashSet<String> = HashSet::new();
    let mut guides: Vec<GuideLink> = Vec::new();

    for link in doc.select(&ANCHOR_SEL) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !href.to_lowercase().contains(".pdf") {
            continue;
        }
        let Ok(abs) = base.join(href) else { continue };
        if !seen.insert(abs.to_string()) {
            continue;
        }

        let inner_img = link.select(&IMG_SEL).next();
        let thumbnail = inner_img
            .and_then(img_source)
            .or_else(|| ancestor_image(&link))
            .and_then(|src| base.join(src).ok())
            .map(|u| u.to_string());

        let text: String = link.text().collect();
        let mut title = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if title.is_empty() {
            title = inner_img
                .and_then(|img| img.value().attr("alt").or_else(|| img.value().attr("title")))
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
        }
        if title.chars().count() < 5 || GENERIC_TITLES.contains(&title.to_lowercase().as_str()) {
            let fallback = names::title_from_url(&abs);
            if !fallback.is_empty() {
                title = fallback;
            }
        }

        guides.push(GuideLink {
            url: abs.to_string(),
            thumbnail,
            title,
        });
    }

    for (css, attr) in [("embed[src]", "src"), ("iframe[src]", "src"), ("object[data]", "data")] {
        let sel = Selector::parse(css).unwrap();
        for el in doc.select(&sel) {
            let Some(val) = el.value().attr(attr) else {
                continue;
            };
            if val.to_lowercase().contains(".pdf") {
                push_plain(val, base, &mut seen, &mut guides);
            }
        }
    }

    for script in doc.select(&SCRIPT_SEL) {
        let body: String = script.text().collect();
        for m in PDF_URL_RE.find_iter(&body) {
            push_plain(m.as_str(), base, &mut seen, &mut guides);
        }
    }

    // Last-resort sweep over every attribute on the page
    for el in doc.select(&ANY_SEL) {
        for (_, value) in el.value().attrs() {
            if value.to_lowercase().contains(".pdf") {
                push_plain(value, base, &mut seen, &mut guides);
            }
        }
    }

    guides.sort_by(|a, b| a.url.cmp(&b.url));
    guides
}

/// Record a PDF found without anchor context: no thumbnail, title
/// derived from the filename.
fn push_plain(raw: &str, base: &Url, seen: &mut HashSet<String>, out: &mut Vec<GuideLink>) {
    let Ok(abs) = base.join(raw) else { return };
    if !seen.insert(abs.to_string()) {
        return;
    }
    let title = names::title_from_url(&abs);
    out.push(GuideLink {
        url: abs.to_string(),
        thumbnail: None,
        title,
    });
}

fn img_source<'a>(img: ElementRef<'a>) -> Option<&'a str> {
    THUMB_ATTRS
        .iter()
        .find_map(|a| img.value().attr(a))
        .filter(|s| !s.trim().is_empty())
}

/// First image under the link's enclosing containers, up to
/// ANCESTOR_DEPTH levels out.
fn ancestor_image<'a>(link: &ElementRef<'a>) -> Option<&'a str> {
    link.ancestors()
        .filter_map(ElementRef::wrap)
        .take(ANCESTOR_DEPTH)
        .find_map(|anc| anc.select(&IMG_SEL).next().and_then(img_source))
}

// ── Tests ──
