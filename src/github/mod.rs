//! Read-only access to the GitHub REST API.
//!
//! Everything here returns slim, decoded records. Nothing in this module
//! knows about tools or the agent.

mod client;
mod decode;
mod error;
mod transport;
mod types;

pub use client::GitHubClient;
pub use decode::decode;
pub use error::GitHubError;
pub use transport::{HttpTransport, Transport, GITHUB_API, HTTP_TIMEOUT};
pub use types::{
    CodeSearchHit, EntryKind, FileRecord, IssueState, IssueSummary, PullRequestSummary,
    RepoMetadata, RepoTree, RepositoryRef, TreeEntry,
};
