use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub static ABSOLUTE_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());

// extension right before the query string, or at the very end
pub static IMAGE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpe?g|png|webp|gif)(\?|$)").unwrap());

pub static VIDEO_FILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.mp4(\?|$)").unwrap());

pub static VIDEO_HINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)video|play").unwrap());

pub static AUDIO_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(mp3|m4a|aac|wav|ogg)(\?|$)|audio").unwrap()
});

/// Mirrors what an upstream most likely means by "present": not null, not false,
/// not zero, not an empty string.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// First key of `keys` holding a non-empty string.
pub fn first_str<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| non_empty_str(object.get(k)))
}
