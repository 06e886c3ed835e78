//! Projection of a [`NormalizedResult`] onto UI affordances.
//!
//! Nothing here touches a screen: rendering produces commands, and whoever
//! owns the surface (a web page, a terminal) applies them in order.

use serde::Serialize;
use std::fmt;
use vidfetch_download::suggest_filename;
use vidfetch_resolver_api::{MediaCategory, NormalizedResult};

#[derive(Serialize, SmartDefault, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    #[default]
    Info,
    Success,
    Error,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusKind::Info => "info",
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        })
    }
}

/// A button offering one media category for saving.
#[derive(Serialize, PartialEq, Eq, Clone, Debug)]
pub struct DownloadAction {
    pub category: MediaCategory,
    pub label: String,
    pub url: String,
    /// Suggested name for the saved file.
    pub filename: String,
}

#[derive(Serialize, PartialEq, Eq, Clone, Debug)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    SetStatus { kind: StatusKind, text: String },
    HideStatus,
    /// Empty the action list and hide the results, preview and thumbnail.
    ClearResults,
    SetPreview { src: String },
    SetThumbnail { src: String },
    SetTitle { text: String },
    AppendAction(DownloadAction),
    ShowResults,
}

impl RenderCommand {
    pub fn status(kind: StatusKind, text: impl Into<String>) -> Self {
        RenderCommand::SetStatus {
            kind,
            text: text.into(),
        }
    }
}

/// Commands that bring the surface back to its idle look.
pub fn clear() -> Vec<RenderCommand> {
    vec![RenderCommand::ClearResults, RenderCommand::HideStatus]
}

/// One action per available category: video, photo, audio, in that order.
pub fn actions(result: &NormalizedResult) -> Vec<DownloadAction> {
    let title = result.title.as_deref();
    MediaCategory::ALL
        .iter()
        .filter_map(|&category| {
            let (label, url) = match category {
                MediaCategory::Video => ("Download Video", result.preview().map(|d| d.url.as_str())),
                MediaCategory::Photo => ("Download Photo", result.thumbnail_url.as_deref()),
                MediaCategory::Audio => ("Download Audio", result.audio_url.as_deref()),
            };
            let url = url?;
            Some(DownloadAction {
                category,
                label: label.to_string(),
                url: url.to_string(),
                filename: suggest_filename(category, url, title),
            })
        })
        .collect()
}

pub fn render(result: &NormalizedResult) -> Vec<RenderCommand> {
    let mut commands = vec![RenderCommand::ClearResults];

    if let Some(preview) = result.preview() {
        commands.push(RenderCommand::SetPreview {
            src: preview.url.clone(),
        });
    }
    if let Some(thumbnail) = &result.thumbnail_url {
        commands.push(RenderCommand::SetThumbnail {
            src: thumbnail.clone(),
        });
    }
    if let Some(title) = &result.title {
        commands.push(RenderCommand::SetTitle {
            text: title.clone(),
        });
    }
    commands.extend(actions(result).into_iter().map(RenderCommand::AppendAction));
    commands.push(RenderCommand::ShowResults);

    commands
}
