use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashSet;
use vidfetch_resolver_api::DownloadCandidate;

use crate::collect::collect_urls;
use crate::common::{first_str, non_empty_str, AUDIO_URL_RE, VIDEO_FILE_RE, VIDEO_HINT_RE};

/// One way of finding download links in a payload.
///
/// `extract` returns `None` when the payload doesn't have the shape the tier
/// looks for. The first tier that returns `Some` wins, even with no candidates.
pub trait LinkTier: Sync + Send {
    fn name(&self) -> &'static str;

    fn extract(&self, payload: &Value) -> Option<Vec<DownloadCandidate>>;
}

pub static DEFAULT_TIERS: Lazy<Vec<Box<dyn LinkTier>>> = Lazy::new(|| {
    vec![
        Box::new(StructuredListTier {}),
        Box::new(WatermarkTier {}),
        Box::new(CollectedTier {}),
    ]
});

pub fn extract_downloads(payload: &Value) -> Vec<DownloadCandidate> {
    extract_with(&DEFAULT_TIERS, payload)
}

pub fn extract_with(tiers: &[Box<dyn LinkTier>], payload: &Value) -> Vec<DownloadCandidate> {
    for tier in tiers {
        if let Some(candidates) = tier.extract(payload) {
            let candidates = dedup_by_url(candidates);
            tracing::debug!(tier = tier.name(), count = candidates.len(), "download tier matched");
            return candidates;
        }
    }
    tracing::debug!("no download tier matched");
    vec![]
}

fn dedup_by_url(candidates: Vec<DownloadCandidate>) -> Vec<DownloadCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect()
}

/// `downloads: [...]`, entries either objects or bare URL strings.
pub struct StructuredListTier {}

impl StructuredListTier {
    fn entry(entry: &Value) -> Option<DownloadCandidate> {
        if let Some(url) = non_empty_str(Some(entry)) {
            return Some(DownloadCandidate::new("Video", url));
        }
        let url = first_str(entry, &["url", "link", "src"])?;
        Some(DownloadCandidate {
            label: first_str(entry, &["label", "quality", "name"])
                .unwrap_or("Video")
                .to_string(),
            url: url.to_string(),
            size: ["size", "filesize"]
                .iter()
                .find_map(|k| size_text(entry.get(k))),
        })
    }
}

fn size_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

impl LinkTier for StructuredListTier {
    fn name(&self) -> &'static str {
        "structured list"
    }

    fn extract(&self, payload: &Value) -> Option<Vec<DownloadCandidate>> {
        let entries = payload
            .get("downloads")
            .and_then(Value::as_array)
            .filter(|entries| !entries.is_empty())?;
        // entries without a URL are dropped, the list still claims the payload
        Some(entries.iter().filter_map(Self::entry).collect())
    }
}

/// TikWM-style `play` (no watermark) and `wmplay` (watermarked) fields.
pub struct WatermarkTier {}

static WATERMARK_FIELDS: [(&str, &str); 2] = [
    ("play", "Without watermark"),
    ("wmplay", "With watermark"),
];

impl LinkTier for WatermarkTier {
    fn name(&self) -> &'static str {
        "watermark fields"
    }

    fn extract(&self, payload: &Value) -> Option<Vec<DownloadCandidate>> {
        let candidates: Vec<DownloadCandidate> = WATERMARK_FIELDS
            .iter()
            .filter_map(|(field, label)| {
                non_empty_str(payload.get(field)).map(|url| DownloadCandidate::new(*label, url))
            })
            .collect();
        if candidates.is_empty() {
            None
        } else {
            Some(candidates)
        }
    }
}

/// Last resort: anything that looks like a video among the collected URLs,
/// or every collected URL when nothing does.
pub struct CollectedTier {}

impl LinkTier for CollectedTier {
    fn name(&self) -> &'static str {
        "collected urls"
    }

    fn extract(&self, payload: &Value) -> Option<Vec<DownloadCandidate>> {
        let urls = collect_urls(payload);
        let preferred: Vec<&String> = urls
            .iter()
            .filter(|u| VIDEO_FILE_RE.is_match(u) || VIDEO_HINT_RE.is_match(u))
            .collect();
        let chosen = if preferred.is_empty() {
            urls.iter().collect()
        } else {
            preferred
        };
        Some(
            chosen
                .into_iter()
                .enumerate()
                .map(|(i, u)| DownloadCandidate::new(format!("Video {}", i + 1), u.as_str()))
                .collect(),
        )
    }
}

/// The single audio candidate, independent of the download tiers.
pub fn pick_audio(payload: &Value) -> Option<String> {
    collect_urls(payload)
        .into_iter()
        .find(|u| AUDIO_URL_RE.is_match(u))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labels(c: &[DownloadCandidate]) -> Vec<&str> {
        c.iter().map(|d| d.label.as_str()).collect()
    }

    fn urls(c: &[DownloadCandidate]) -> Vec<&str> {
        c.iter().map(|d| d.url.as_str()).collect()
    }

    #[test]
    fn watermark_fields_in_order_ignoring_collected() {
        let v = json!({
            "wmplay": "https://x/wm.mp4",
            "play": "https://x/nowm.mp4",
            "other": "https://x/video/extra.mp4"
        });
        let d = extract_downloads(&v);
        assert_eq!(labels(&d), vec!["Without watermark", "With watermark"]);
        assert_eq!(urls(&d), vec!["https://x/nowm.mp4", "https://x/wm.mp4"]);
    }

    #[test]
    fn only_play_and_wmplay_count() {
        let v = json!({
            "play": "https://x/p.mp4",
            "hdplay": "https://x/hd.mp4",
            "wmplay": "https://x/wm.mp4"
        });
        assert_eq!(
            labels(&extract_downloads(&v)),
            vec!["Without watermark", "With watermark"]
        );
    }

    #[test]
    fn nested_play_goes_through_collector() {
        let v = json!({"code": 0, "data": {"play": "https://x/a", "music": "https://x/m.mp3"}});
        let d = extract_downloads(&v);
        assert_eq!(labels(&d), vec!["Video 1", "Video 2"]);
        assert_eq!(urls(&d), vec!["https://x/a", "https://x/m.mp3"]);
    }

    #[test]
    fn structured_list_wins() {
        let v = json!({
            "downloads": [
                {"quality": "hd", "url": "https://x/hd.mp4"},
                {"url": "https://x/sd.mp4"}
            ],
            "play": "https://x/nowm.mp4"
        });
        let d = extract_downloads(&v);
        assert_eq!(labels(&d), vec!["hd", "Video"]);
        assert_eq!(urls(&d), vec!["https://x/hd.mp4", "https://x/sd.mp4"]);
    }

    #[test]
    fn structured_entries_resolve_fields() {
        let v = json!({
            "downloads": [
                "https://x/bare.mp4",
                {"name": "n", "link": "https://x/l.mp4", "filesize": 1024},
                {"label": "", "quality": "q", "src": "https://x/s.mp4", "size": "2 MB"},
                {"label": "no url here"}
            ]
        });
        let d = extract_downloads(&v);
        assert_eq!(labels(&d), vec!["Video", "n", "q"]);
        assert_eq!(
            urls(&d),
            vec!["https://x/bare.mp4", "https://x/l.mp4", "https://x/s.mp4"]
        );
        assert_eq!(d[0].size, None);
        assert_eq!(d[1].size.as_deref(), Some("1024"));
        assert_eq!(d[2].size.as_deref(), Some("2 MB"));
    }

    #[test]
    fn structured_list_without_urls_still_blocks_later_tiers() {
        let v = json!({"downloads": [{"label": "x"}], "play": "https://x/p.mp4"});
        assert!(extract_downloads(&v).is_empty());
    }

    #[test]
    fn empty_structured_list_falls_through() {
        let v = json!({"downloads": [], "play": "https://x/p.mp4"});
        assert_eq!(labels(&extract_downloads(&v)), vec!["Without watermark"]);
    }

    #[test]
    fn structured_duplicates_collapse() {
        let v = json!({"downloads": ["https://x/a.mp4", {"url": "https://x/a.mp4", "label": "again"}]});
        assert_eq!(extract_downloads(&v).len(), 1);
    }

    #[test]
    fn collected_prefers_video_like() {
        let v = json!({"files": ["https://x/a.txt", "https://x/b.mp4", "https://x/c.mp4?x=1"]});
        let d = extract_downloads(&v);
        assert_eq!(labels(&d), vec!["Video 1", "Video 2"]);
        assert_eq!(urls(&d), vec!["https://x/b.mp4", "https://x/c.mp4?x=1"]);
    }

    #[test]
    fn collected_matches_words() {
        let v = json!({"a": "https://x/Player/1", "b": "https://x/readme", "c": "https://cdn/VIDEO?id=2"});
        assert_eq!(
            urls(&extract_downloads(&v)),
            vec!["https://x/Player/1", "https://cdn/VIDEO?id=2"]
        );
    }

    #[test]
    fn collected_falls_back_to_everything() {
        let v = json!({"a": "https://x/a.txt", "b": ["https://x/b.bin", "https://x/a.txt"]});
        let d = extract_downloads(&v);
        assert_eq!(labels(&d), vec!["Video 1", "Video 2"]);
        assert_eq!(urls(&d), vec!["https://x/a.txt", "https://x/b.bin"]);
    }

    #[test]
    fn nothing_at_all() {
        assert!(extract_downloads(&json!({"title": "no links"})).is_empty());
        assert!(extract_downloads(&json!(null)).is_empty());
    }

    #[test]
    fn audio_by_extension_or_word() {
        let v = json!({"v": "https://x/v.mp4", "m": "https://x/track.M4A?t=1"});
        assert_eq!(pick_audio(&v).as_deref(), Some("https://x/track.M4A?t=1"));
        let v = json!({"music": "https://x/audio/123"});
        assert_eq!(pick_audio(&v).as_deref(), Some("https://x/audio/123"));
        assert_eq!(pick_audio(&json!({"v": "https://x/v.mp4"})), None);
    }

    #[test]
    fn custom_tier_list() {
        let tiers: Vec<Box<dyn LinkTier>> = vec![Box::new(CollectedTier {})];
        let v = json!({"play": "https://x/p.mp4"});
        assert_eq!(labels(&extract_with(&tiers, &v)), vec!["Video 1"]);
    }
}
