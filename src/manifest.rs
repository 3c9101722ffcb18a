use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Machine-readable record of a run, written next to the gallery.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub guides: Vec<GuideRecord>,
}

#[derive(Debug, Serialize)]
pub struct GuideRecord {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<MatchedVideo>,
}

#[derive(Debug, Serialize)]
pub struct MatchedVideo {
    pub url: String,
    pub score: f64,
}

pub fn write(path: &Path, manifest: &Manifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_optionals_are_omitted() {
        let m = Manifest {
            source: "https://nudel.example/pages/step-by-step".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
            guides: vec![GuideRecord {
                title: "Build a Cube".to_string(),
                url: "https://nudel.example/files/cube.pdf".to_string(),
                file: None,
                thumbnail: None,
                video: None,
            }],
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"title\":\"Build a Cube\""));
        assert!(!json.contains("thumbnail"));
        assert!(!json.contains("video"));
    }

    #[test]
    fn match_score_serialized() {
        let record = GuideRecord {
            title: "Build a Cube".to_string(),
            url: "https://nudel.example/files/cube.pdf".to_string(),
            file: Some("cube.pdf".to_string()),
            thumbnail: Some("cube_thumb.jpg".to_string()),
            video: Some(MatchedVideo {
                url: "https://youtu.be/abc".to_string(),
                score: 1.0,
            }),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"score\":1.0"));
        assert!(json.contains("https://youtu.be/abc"));
    }
}
