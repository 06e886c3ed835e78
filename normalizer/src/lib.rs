mod collect;
mod common;
pub mod downloads;
mod thumbnail;
mod title;

pub use collect::collect_urls;
pub use common::is_truthy;
pub use downloads::{extract_downloads, pick_audio, LinkTier};
pub use thumbnail::pick_thumbnail;
pub use title::extract_title;

use serde_json::Value;
use vidfetch_resolver_api::NormalizedResult;

/// Peels one `{"ok": true, "result": {...}}` wrapper, if there is one.
pub fn unwrap_envelope(payload: &Value) -> &Value {
    match (payload.get("ok"), payload.get("result")) {
        (Some(ok), Some(result)) if is_truthy(ok) && is_truthy(result) => result,
        _ => payload,
    }
}

/// Runs every picker over an (already unwrapped) payload.
pub fn normalize(payload: &Value) -> NormalizedResult {
    let result = NormalizedResult {
        title: extract_title(payload),
        thumbnail_url: pick_thumbnail(payload),
        downloads: extract_downloads(payload),
        audio_url: pick_audio(payload),
    };
    tracing::debug!(
        title = ?result.title,
        downloads = result.downloads.len(),
        thumbnail = result.thumbnail_url.is_some(),
        audio = result.audio_url.is_some(),
        "payload normalized"
    );
    result
}
