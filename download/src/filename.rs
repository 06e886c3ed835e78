//! Filenames for saved media.

use vidfetch_resolver_api::url::Url;
use vidfetch_resolver_api::MediaCategory;

const NAME_MAX: usize = 255;
const STEM_MAX_CHARS: usize = 80;

/// Makes `name` safe to use as a single path component.
///
/// - Replaces NUL, `/`, `\`, control characters and whitespace with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores
/// - Limits length to 255 bytes
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace()
        {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

fn known_extensions(category: MediaCategory) -> &'static [&'static str] {
    match category {
        MediaCategory::Video => &["mp4", "webm", "mov", "mkv"],
        MediaCategory::Photo => &["jpg", "jpeg", "png", "webp", "gif"],
        MediaCategory::Audio => &["mp3", "m4a", "aac", "wav", "ogg"],
    }
}

fn default_extension(category: MediaCategory) -> &'static str {
    known_extensions(category)[0]
}

/// Extension from the last path segment of `url`, if it's one we expect for `category`.
fn extension_from_url(url: &str, category: MediaCategory) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.last()?;
    let (_, ext) = last.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    known_extensions(category)
        .contains(&ext.as_str())
        .then_some(ext)
}

/// Filename offered for a download action: the title when there is one,
/// the category otherwise, with an extension guessed from the URL.
pub fn suggest_filename(category: MediaCategory, url: &str, title: Option<&str>) -> String {
    let stem = title
        .map(|t| t.chars().take(STEM_MAX_CHARS).collect::<String>())
        .map(|t| sanitize_filename(&t))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| category.as_str().to_string());
    let ext = extension_from_url(url, category)
        .unwrap_or_else(|| default_extension(category).to_string());
    format!("{stem}.{ext}")
}
