#[macro_use]
extern crate smart_default;

pub mod logging;
pub mod render;
mod session;
mod validate;

pub use render::{DownloadAction, RenderCommand, StatusKind};
pub use session::{Session, SessionState, Submission, Ticket};
pub use validate::validate_target;
pub use vidfetch_download::{sanitize_filename, suggest_filename, Downloader};
pub use vidfetch_normalizer::{normalize, unwrap_envelope};
pub use vidfetch_resolver_api::*;

use std::path::{Path, PathBuf};
use vidfetch_resolver_api::serde_json::Value;

/// Runs one submission through `api`: validate, fetch, then render.
/// Invalid input and a busy session never reach the network.
pub async fn drive(
    api: &dyn UpstreamApi,
    session: &mut Session,
    input: &str,
) -> Vec<RenderCommand> {
    match session.submit(input) {
        Submission::Busy => vec![],
        Submission::Rejected { commands } => commands,
        Submission::Started {
            ticket,
            target,
            mut commands,
        } => {
            let outcome = api.fetch_payload(&target).await;
            commands.extend(session.complete(ticket, outcome));
            commands
        }
    }
}

pub struct CoreClient {
    context: ResolveContext,
    downloader: Downloader,
}

impl CoreClient {
    pub fn new(config: RequestConfig) -> Result<Self, ResolveError> {
        Ok(CoreClient {
            context: ResolveContext::new(config)?,
            downloader: Downloader::new(),
        })
    }

    pub fn with_context(context: ResolveContext) -> Self {
        CoreClient {
            context,
            downloader: Downloader::new(),
        }
    }

    pub fn context(&self) -> &ResolveContext {
        &self.context
    }

    /// Raw upstream payload for `target`, without touching any session.
    pub async fn resolve(&self, target: &str) -> Result<Value, ResolveError> {
        self.context.fetch_payload(target).await
    }

    pub async fn run(&self, session: &mut Session, input: &str) -> Vec<RenderCommand> {
        drive(&self.context, session, input).await
    }

    /// Saves the current result's `category` media into `dir`.
    /// Returns the status commands, plus the saved path on success.
    pub async fn save(
        &self,
        session: &mut Session,
        category: MediaCategory,
        dir: &Path,
    ) -> (Vec<RenderCommand>, Option<PathBuf>) {
        let (action, mut commands) = match session.begin_save(category) {
            Ok(started) => started,
            Err(commands) => return (commands, None),
        };

        let outcome = self
            .downloader
            .save(&self.context, &action.url, &action.filename, dir)
            .await;
        commands.extend(session.finish_save(outcome.as_deref()));
        (commands, outcome.ok())
    }
}
