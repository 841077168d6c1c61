use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::VideoIdentity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Cached result for one (video, language) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub original: Vec<Segment>,
    pub translation: Vec<Segment>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// The persisted unit: one per video identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub video_identity: VideoIdentity,
    pub video_url: String,
    pub languages: BTreeMap<String, LanguageEntry>,
    pub cached_at: u64,
}

impl CacheRecord {
    pub fn new(video_identity: VideoIdentity, video_url: &str, now: u64) -> Self {
        Self {
            video_identity,
            video_url: video_url.to_string(),
            languages: BTreeMap::new(),
            cached_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedTranslation {
    pub original: Vec<Segment>,
    pub translation: Vec<Segment>,
}

/// Body of `POST /api/process-video`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessVideoRequest {
    pub video_url: String,
    pub target_languages: Vec<String>,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessVideoResponse {
    pub success: bool,
    #[serde(default)]
    pub original: Vec<Segment>,
    #[serde(default)]
    pub translations: BTreeMap<String, Vec<Segment>>,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub target_languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}
