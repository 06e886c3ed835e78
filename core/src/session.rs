use std::path::Path;
use vidfetch_normalizer::{normalize, unwrap_envelope};
use vidfetch_resolver_api::serde_json::Value;
use vidfetch_resolver_api::{MediaCategory, NormalizedResult, ResolveError};

use crate::render::{self, actions, DownloadAction, RenderCommand, StatusKind};
use crate::validate::validate_target;

#[derive(SmartDefault, PartialEq, Eq, Clone, Copy, Debug)]
pub enum SessionState {
    #[default]
    Idle,
    Requesting,
    Rendered,
    Errored,
}

/// Handed out when a resolution starts; a response is only accepted
/// with the ticket of the most recent submission.
#[derive(PartialEq, Eq, Debug)]
pub struct Ticket(u64);

pub enum Submission {
    /// Fetch the payload for `target`, then pass it to [`Session::complete`].
    Started {
        ticket: Ticket,
        /// The trimmed input, exactly as typed.
        target: String,
        commands: Vec<RenderCommand>,
    },
    /// Bad input, no request was made.
    Rejected { commands: Vec<RenderCommand> },
    /// A resolution is already pending; the control stays disabled.
    Busy,
}

/// What the user sees, and which request is allowed to change it.
#[derive(Default)]
pub struct Session {
    state: SessionState,
    generation: u64,
    current: Option<NormalizedResult>,
    saving: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The result on display, if the last resolution rendered.
    pub fn current(&self) -> Option<&NormalizedResult> {
        self.current.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn submit(&mut self, input: &str) -> Submission {
        if self.state == SessionState::Requesting {
            return Submission::Busy;
        }
        let target = match validate_target(input) {
            Ok(t) => t.to_string(),
            Err(e) => {
                return Submission::Rejected {
                    commands: vec![RenderCommand::status(StatusKind::Error, e.to_string())],
                }
            }
        };

        self.generation += 1;
        self.state = SessionState::Requesting;
        self.current = None;

        let mut commands = render::clear();
        commands.push(RenderCommand::status(StatusKind::Info, "Contacting API..."));
        Submission::Started {
            ticket: Ticket(self.generation),
            target,
            commands,
        }
    }

    /// Feeds the outcome of a request back in. Stale tickets change nothing.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<Value, ResolveError>,
    ) -> Vec<RenderCommand> {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "dropping stale response"
            );
            return vec![];
        }

        match outcome {
            Ok(payload) => {
                let result = normalize(unwrap_envelope(&payload));
                let mut commands = vec![RenderCommand::status(
                    StatusKind::Success,
                    "Response received. Rendering...",
                )];
                commands.extend(render::render(&result));
                if result.is_empty() {
                    tracing::warn!("response carried nothing recognizable");
                } else {
                    tracing::info!(
                        downloads = result.downloads.len(),
                        "resolution rendered"
                    );
                }
                self.current = Some(result);
                self.state = SessionState::Rendered;
                commands
            }
            Err(e) => {
                if let Some(raw) = e.raw() {
                    tracing::debug!(%raw, "upstream raw body");
                }
                if e.is_transport() {
                    tracing::warn!("upstream request failed: {e}");
                } else {
                    tracing::warn!("resolution failed: {e}");
                }
                self.state = SessionState::Errored;
                vec![RenderCommand::status(
                    StatusKind::Error,
                    resolve_failure_message(&e),
                )]
            }
        }
    }

    /// Back to idle. A response still in flight will be dropped when it lands.
    pub fn clear(&mut self) -> Vec<RenderCommand> {
        self.generation += 1;
        self.state = SessionState::Idle;
        self.current = None;
        render::clear()
    }

    /// Picks the action to save. `Err` carries what to show instead.
    pub fn begin_save(
        &mut self,
        category: MediaCategory,
    ) -> Result<(DownloadAction, Vec<RenderCommand>), Vec<RenderCommand>> {
        if self.saving {
            return Err(vec![]);
        }
        let action = self
            .current
            .as_ref()
            .and_then(|r| actions(r).into_iter().find(|a| a.category == category));
        match action {
            Some(action) => {
                self.saving = true;
                Ok((
                    action,
                    vec![RenderCommand::status(StatusKind::Info, "Downloading file...")],
                ))
            }
            None => Err(vec![RenderCommand::status(
                StatusKind::Error,
                "Download URL not available.",
            )]),
        }
    }

    pub fn finish_save(&mut self, outcome: Result<&Path, &ResolveError>) -> Vec<RenderCommand> {
        self.saving = false;
        match outcome {
            Ok(path) => vec![RenderCommand::status(
                StatusKind::Success,
                format!("Saved to {}", path.display()),
            )],
            Err(e) => {
                tracing::warn!("download failed: {e}");
                vec![RenderCommand::status(
                    StatusKind::Error,
                    save_failure_message(e),
                )]
            }
        }
    }
}

fn resolve_failure_message(e: &ResolveError) -> String {
    if e.is_cors_like() {
        "Error: Request blocked (CORS). Use a server-side proxy, or enable the CORS proxy for testing."
            .to_string()
    } else {
        format!("Error: {e}")
    }
}

fn save_failure_message(e: &ResolveError) -> String {
    if e.is_cors_like() {
        "Error: Download failed, probably blocked by CORS. Use a server-side proxy.".to_string()
    } else {
        format!("Error: {e}")
    }
}
