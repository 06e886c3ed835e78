use serde_json::Value;

use crate::common::first_str;

pub fn extract_title(payload: &Value) -> Option<String> {
    first_str(payload, &["title", "name", "desc"])
        .or_else(|| payload.get("data").and_then(|d| first_str(d, &["title"])))
        .map(str::to_string)
}
