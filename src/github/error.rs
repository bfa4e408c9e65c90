//! Error types for repository API access.

use thiserror::Error;

/// Failure of a single repository API call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GitHubError {
    /// No credential was supplied.
    #[error("Missing GITHUB_TOKEN")]
    MissingToken,

    /// HTTP 404 for the requested resource.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Any other non-2xx status.
    #[error("GitHub API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Transport(String),

    /// The response body was not the JSON shape we expected.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl GitHubError {
    /// Category used when the failure is reported back to the agent.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "configuration",
            Self::NotFound { .. } => "not_found",
            Self::Status { .. } | Self::Timeout(_) | Self::Transport(_) | Self::Malformed(_) => {
                "upstream"
            }
        }
    }

    /// HTTP status code, when the failure carried one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a rejected or missing credential.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::MissingToken | Self::Status { status: 401, .. })
    }
}
