use serde_json::Value;
use std::collections::HashSet;

use crate::common::ABSOLUTE_URL_RE;

/// Every string in `value` that looks like an absolute http(s) URL.
///
/// Depth-first, object members in document order, array items in index order.
/// Strings are trimmed before matching; the first occurrence of a URL wins.
pub fn collect_urls(value: &Value) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = vec![];
    collect_into(value, &mut seen, &mut urls);
    urls
}

fn collect_into(value: &Value, seen: &mut HashSet<String>, urls: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if ABSOLUTE_URL_RE.is_match(s) && seen.insert(s.to_string()) {
                urls.push(s.to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_into(item, seen, urls);
            }
        }
        Value::Object(members) => {
            for member in members.values() {
                collect_into(member, seen, urls);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
