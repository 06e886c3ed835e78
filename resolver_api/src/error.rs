use thiserror::Error;

/// Everything that can go wrong between the user's input and a saved file.
/// Each kind ends up as one status message; none of them is fatal to the session.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The input was rejected before any network call.
    #[error("{0}")]
    InvalidInput(String),

    /// Upstream answered, but not with a success status.
    #[error("HTTP {status}")]
    Http { status: u16, raw: String },

    /// Network unreachable, timeout, TLS and friends.
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("Upstream returned non-JSON response")]
    Parse { raw: String },

    /// Fetching or writing a file for the save flow failed.
    #[error("{0}")]
    Download(String),

    /// The HTTP client could not be built from the configuration.
    #[error("invalid client configuration: {0}")]
    Client(String),
}

impl ResolveError {
    /// The raw upstream body, when there was one.
    pub fn raw(&self) -> Option<&str> {
        match self {
            ResolveError::Http { raw, .. } | ResolveError::Parse { raw } => Some(raw),
            _ => None,
        }
    }

    /// Heuristic: browsers and proxies mention CORS when a cross-origin fetch is refused.
    pub fn is_cors_like(&self) -> bool {
        self.to_string().to_lowercase().contains("cors")
            || self
                .raw()
                .map(|r| r.to_lowercase().contains("cors"))
                .unwrap_or(false)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ResolveError::Http { .. } | ResolveError::Network(_))
    }
}
