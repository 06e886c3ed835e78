use serde_json::Value;

use crate::collect::collect_urls;
use crate::common::{first_str, IMAGE_URL_RE};

/// Best guess at a picture for the payload: explicit fields first,
/// then the first collected URL with an image extension.
pub fn pick_thumbnail(payload: &Value) -> Option<String> {
    first_str(payload, &["thumbnail", "cover"])
        .or_else(|| {
            payload
                .get("data")
                .and_then(|data| first_str(data, &["cover", "thumbnail"]))
        })
        .map(str::to_string)
        .or_else(|| {
            collect_urls(payload)
                .into_iter()
                .find(|u| IMAGE_URL_RE.is_match(u))
        })
}
