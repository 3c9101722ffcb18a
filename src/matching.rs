use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\blevel[^0-9a-z]*([0-9]+)").unwrap());
static LEVEL_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^level [0-9]+( |$)").unwrap());

const SCORE_THRESHOLD: f64 = 0.55;
const TIE_EPSILON: f64 = 0.05;
const TOKEN_WEIGHT: f64 = 0.6;
const SEQUENCE_WEIGHT: f64 = 0.4;
const CONTAINMENT_BONUS: f64 = 0.15;

/// Canonical form of a guide or video title: lowercase, separators
/// collapsed to single spaces, punctuation dropped, leading "level N"
/// prefixes removed. Idempotent.
pub fn normalize(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' || ch == '/' {
            out.push(' ');
        }
        // other punctuation dropped
    }
    let mut collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");

    // Strip until stable so a stripped string normalizes to itself
    while let Some(m) = LEVEL_PREFIX_RE.find(&collapsed) {
        let end = m.end();
        collapsed = collapsed[end..].trim_start().to_string();
    }
    collapsed
}

/// Level number from a raw title ("Level 2 - ...", "level_3_tower",
/// "Level: 4"), wherever it appears.
pub fn parse_level(title: &str) -> Option<u32> {
    LEVEL_RE
        .captures(&title.to_lowercase())
        .and_then(|c| c[1].parse().ok())
}

/// Similarity between two titles in [0.0, 1.0]. Symmetric; 1.0 exactly
/// when the normalized forms are equal.
pub fn score(a: &str, b: &str) -> f64 {
    score_normalized(&normalize(a), &normalize(b))
}

fn score_normalized(na: &str, nb: &str) -> f64 {
    if na == nb {
        return 1.0;
    }
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    let mut s = TOKEN_WEIGHT * token_jaccard(na, nb) + SEQUENCE_WEIGHT * bigram_dice(na, nb);
    if na.contains(nb) || nb.contains(na) {
        s += CONTAINMENT_BONUS;
    }
    s.min(1.0)
}

fn token_jaccard(a: &str, b: &str) -> f64 {
    let ta: HashSet<&str> = a.split_whitespace().collect();
    let tb: HashSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let inter = ta.intersection(&tb).count() as f64;
    let union = ta.union(&tb).count() as f64;
    inter / union
}

/// Dice coefficient over character bigrams (multiset overlap).
fn bigram_dice(a: &str, b: &str) -> f64 {
    let ba = bigrams(a);
    let bb = bigrams(b);
    if ba.is_empty() || bb.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<(char, char), usize> = HashMap::new();
    for bg in &ba {
        *counts.entry(*bg).or_insert(0) += 1;
    }
    let mut overlap = 0usize;
    for bg in &bb {
        if let Some(n) = counts.get_mut(bg) {
            if *n > 0 {
                *n -= 1;
                overlap += 1;
            }
        }
    }
    2.0 * overlap as f64 / (ba.len() + bb.len()) as f64
}

fn bigrams(s: &str) -> Vec<(char, char)> {
    s.chars().zip(s.chars().skip(1)).collect()
}

// ── Title index ──

/// A video the index matched a guide title to.
#[derive(Debug, Clone)]
pub struct VideoMatch {
    pub title: String,
    pub url: String,
    pub score: f64,
}

struct IndexedVideo {
    title: String,
    norm: String,
    level: Option<u32>,
    url: String,
}

/// Normalized-title → video-URL index built from scraped video pages.
#[derive(Default)]
pub struct TitleIndex {
    entries: Vec<IndexedVideo>,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add one video. Entries with an empty normalized title or an
    /// already-indexed URL are ignored.
    pub fn insert(&mut self, title: &str, url: &str) {
        if url.is_empty() || self.entries.iter().any(|e| e.url == url) {
            return;
        }
        let norm = normalize(title);
        if norm.is_empty() {
            return;
        }
        self.entries.push(IndexedVideo {
            title: title.trim().to_string(),
            norm,
            level: parse_level(title),
            url: url.to_string(),
        });
    }

    /// Best video for a guide title: exact normalized equality wins
    /// outright, otherwise the highest similarity at or above the
    /// threshold. A same-level entry within TIE_EPSILON of the top
    /// score is preferred over a cross-level one.
    pub fn best_match(&self, title: &str) -> Option<VideoMatch> {
        let norm = normalize(title);
        if norm.is_empty() {
            return None;
        }

        if let Some(e) = self.entries.iter().find(|e| e.norm == norm) {
            return Some(VideoMatch {
                title: e.title.clone(),
                url: e.url.clone(),
                score: 1.0,
            });
        }

        let level = parse_level(title);
        let scored: Vec<(usize, f64)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, score_normalized(&norm, &e.norm)))
            .filter(|(_, s)| *s >= SCORE_THRESHOLD)
            .collect();

        let (best_i, best_s) = scored
            .iter()
            .copied()
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        let (pick_i, pick_s) = scored
            .iter()
            .copied()
            .filter(|(i, s)| {
                *s >= best_s - TIE_EPSILON && level.is_some() && self.entries[*i].level == level
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((best_i, best_s));

        let e = &self.entries[pick_i];
        Some(VideoMatch {
            title: e.title.clone(),
            url: e.url.clone(),
            score: pick_s,
        })
    }

    /// Every entry scored against a title, highest first. Debugging aid
    /// for the `match` subcommand.
    pub fn scores(&self, title: &str) -> Vec<VideoMatch> {
        let norm = normalize(title);
        let mut all: Vec<VideoMatch> = self
            .entries
            .iter()
            .map(|e| VideoMatch {
                title: e.title.clone(),
                url: e.url.clone(),
                score: score_normalized(&norm, &e.norm),
            })
            .collect();
        all.sort_by(|a, b| b.score.total_cmp(&a.score));
        all
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_level_prefix() {
        assert_eq!(normalize("Level 2 - Build a Cube"), "build a cube");
        assert_eq!(normalize("level_3_tower"), "tower");
        assert_eq!(normalize("LEVEL 10: Big Bridge"), "big bridge");
    }

    #[test]
    fn normalize_keeps_level_elsewhere() {
        assert_eq!(normalize("Tower Level 3"), "tower level 3");
    }

    #[test]
    fn normalize_separators_and_punctuation() {
        assert_eq!(normalize("Build_a-Cube"), "build a cube");
        assert_eq!(normalize("Let's  Build It!"), "lets build it");
        assert_eq!(normalize("swing/seesaw (outdoor)"), "swing seesaw outdoor");
    }

    #[test]
    fn normalize_idempotent() {
        for raw in [
            "Level 2 - Build a Cube",
            "Level 2 Level 3 Foo",
            "Let's Build It!",
            "  spaced   out  ",
            "",
            "plain title",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn parse_level_variants() {
        assert_eq!(parse_level("Level 2 - Build a Cube"), Some(2));
        assert_eq!(parse_level("level_4_swing"), Some(4));
        assert_eq!(parse_level("Level: 12"), Some(12));
        assert_eq!(parse_level("level2"), Some(2));
        assert_eq!(parse_level("Bilevel 2 deck"), None);
        assert_eq!(parse_level("No number here"), None);
    }

    #[test]
    fn score_symmetric() {
        let pairs = [
            ("Build a Cube", "How to build a cube tower"),
            ("Level 2 - Swing", "swing set assembly"),
            ("totally unrelated", "build a cube"),
        ];
        for (a, b) in pairs {
            assert_eq!(score(a, b), score(b, a));
        }
    }

    #[test]
    fn exact_normalized_match_scores_one() {
        assert_eq!(score("Level 2 - Build a Cube", "level 2 build a cube"), 1.0);
        assert_eq!(score("Build_a_Cube", "build a cube"), 1.0);
    }

    #[test]
    fn containment_raises_score() {
        let contained = score("build a cube", "build a cube step by step");
        let disjoint = score("build a cube", "paint a fence step by step");
        assert!(contained > disjoint);
        assert!(contained >= SCORE_THRESHOLD);
    }

    #[test]
    fn score_capped_at_one() {
        assert!(score("build a cube", "build a cube tower") <= 1.0);
    }

    #[test]
    fn best_match_exact() {
        let mut index = TitleIndex::new();
        index.insert("level 2 build a cube", "https://videos.example/cube");
        let m = index.best_match("Level 2 - Build a Cube").unwrap();
        assert_eq!(m.url, "https://videos.example/cube");
        assert_eq!(m.score, 1.0);
    }

    #[test]
    fn best_match_fuzzy() {
        let mut index = TitleIndex::new();
        index.insert("Building a Cube Fort (tutorial)", "https://videos.example/fort");
        index.insert("Painting a Fence", "https://videos.example/fence");
        let m = index.best_match("Build a Cube Fort").unwrap();
        assert_eq!(m.url, "https://videos.example/fort");
        assert!(m.score < 1.0);
    }

    #[test]
    fn best_match_rejects_unrelated() {
        let mut index = TitleIndex::new();
        index.insert("Painting a Fence", "https://videos.example/fence");
        assert!(index.best_match("Rocket Ship Assembly").is_none());
    }

    #[test]
    fn best_match_prefers_same_level_on_close_scores() {
        let mut index = TitleIndex::new();
        // Identical once normalized, so scores tie; level must decide.
        index.insert("Level 2 - Tower of Cubes", "https://videos.example/t2");
        index.insert("Level 3 - Tower of Cubes", "https://videos.example/t3");
        let m = index.best_match("Level 2: Tower of the Cubes").unwrap();
        assert_eq!(m.url, "https://videos.example/t2");
    }

    #[test]
    fn index_dedupes_urls() {
        let mut index = TitleIndex::new();
        index.insert("Build a Cube", "https://videos.example/cube");
        index.insert("Build a Cube (repost)", "https://videos.example/cube");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn empty_index_and_empty_title() {
        let index = TitleIndex::new();
        assert!(index.best_match("anything").is_none());
        let mut index = TitleIndex::new();
        index.insert("Build a Cube", "https://videos.example/cube");
        assert!(index.best_match("!!!").is_none());
    }
}
