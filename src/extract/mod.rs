pub mod guides;
pub mod videos;

/// One downloadable guide found on the page: absolute PDF URL, an
/// optional absolute thumbnail URL, and a display title.
#[derive(Debug, Clone)]
pub struct GuideLink {
    pub url: String,
    pub thumbnail: Option<String>,
    pub title: String,
}

/// One instructional video found on an auxiliary page.
#[derive(Debug, Clone)]
pub struct VideoEntry {
    pub title: String,
    pub url: String,
}
