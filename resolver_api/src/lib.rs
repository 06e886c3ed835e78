#[macro_use]
extern crate smart_default;

pub mod config;
mod context;
mod error;

pub use config::RequestConfig;
pub use context::{build_http, ResolveContext};
pub use error::ResolveError;

pub use anyhow;
pub use async_trait::async_trait;
pub use reqwest;
pub use serde_json;
pub use url;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Anything that can turn a target video URL into the raw upstream payload.
///
/// The payload shape is unknown; interpreting it is the normalizer's job.
#[async_trait]
pub trait UpstreamApi: Sync + Send {
    async fn fetch_payload(&self, target: &str) -> Result<Value, ResolveError>;
}

/// What came out of one upstream response, after normalization.
/// Replaced as a whole by the next response, never merged.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct NormalizedResult {
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Ordered by priority; the first one is the default preview/download target.
    pub downloads: Vec<DownloadCandidate>,
    /// Only one audio candidate is ever surfaced.
    pub audio_url: Option<String>,
}

impl NormalizedResult {
    pub fn preview(&self) -> Option<&DownloadCandidate> {
        self.downloads.first()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.thumbnail_url.is_none()
            && self.downloads.is_empty()
            && self.audio_url.is_none()
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct DownloadCandidate {
    pub label: String,
    pub url: String,
    pub size: Option<String>,
}

impl DownloadCandidate {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        DownloadCandidate {
            label: label.into(),
            url: url.into(),
            size: None,
        }
    }
}

/// Media category of a download action, in display order.
#[derive(Serialize, Deserialize, SmartDefault, PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    #[default]
    Video,
    /// the thumbnail, offered as a picture to save
    Photo,
    Audio,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 3] = [
        MediaCategory::Video,
        MediaCategory::Photo,
        MediaCategory::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Video => "video",
            MediaCategory::Photo => "photo",
            MediaCategory::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(MediaCategory::Video),
            "photo" | "thumbnail" => Ok(MediaCategory::Photo),
            "audio" => Ok(MediaCategory::Audio),
            other => Err(format!("unknown media category: {other}")),
        }
    }
}
