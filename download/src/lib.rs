mod filename;
mod http;

pub use filename::{sanitize_filename, suggest_filename};
pub use http::HTTPDownloader;

use std::path::{Path, PathBuf};
use vidfetch_resolver_api::{ResolveContext, ResolveError};

pub struct Downloader {
    http: HTTPDownloader,
}

impl Downloader {
    pub fn new() -> Self {
        Self {
            http: HTTPDownloader::new(),
        }
    }

    /// Saves `url` as `dir/<filename>`, the filename being sanitized first.
    pub async fn save<P>(
        &self,
        ctx: &ResolveContext,
        url: &str,
        filename: &str,
        dir: P,
    ) -> Result<PathBuf, ResolveError>
    where
        P: AsRef<Path>,
    {
        let name = match sanitize_filename(filename) {
            n if n.is_empty() => "video.mp4".to_string(),
            n => n,
        };
        let output = dir.as_ref().join(name);
        let bytes = self.http.download_to(ctx, url, &output).await?;
        tracing::info!(bytes, path = %output.display(), "saved download");
        Ok(output)
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}
