//! Records returned by the data access layer.
//!
//! The `Raw*` structs mirror just enough of the upstream payloads to build
//! the slim records handed to tools; every other upstream field is ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A repository identifier (`owner/name`) plus an optional branch or SHA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    owner: String,
    name: String,
    /// Branch, tag or commit SHA. `None` means "the default branch".
    pub git_ref: Option<String>,
}

impl RepositoryRef {
    /// Parse an `owner/name` identifier.
    pub fn parse(repo: &str) -> Result<Self, String> {
        let repo = repo.trim();
        let (owner, name) = repo
            .split_once('/')
            .ok_or_else(|| format!("Repository must be 'owner/name', got '{}'", repo))?;

        // `.` and `..` would escape the `/repos/{owner}/{name}` prefix.
        let valid = |s: &str| {
            !s.is_empty()
                && !s.chars().all(|c| c == '.')
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        if !valid(owner) || !valid(name) {
            return Err(format!("Repository must be 'owner/name', got '{}'", repo));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            git_ref: None,
        })
    }

    /// Attach a ref; blank refs are treated as absent.
    #[must_use]
    pub fn with_ref(mut self, git_ref: Option<&str>) -> Self {
        self.git_ref = git_ref
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Same repository, ignoring the ref. Owner and name compare
    /// case-insensitively, as GitHub does.
    pub fn same_repo(&self, other: &RepositoryRef) -> bool {
        self.owner.eq_ignore_ascii_case(&other.owner) && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository metadata used for default-branch resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoMetadata {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub private: bool,
}

/// Git object type of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule pointer
    Commit,
    #[serde(other)]
    Other,
}

/// One entry of a flattened recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub path: String,
}

/// A recursive tree in upstream order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoTree {
    #[serde(default, rename = "tree")]
    pub entries: Vec<TreeEntry>,
    /// Set by the API when the listing exceeded its own limits.
    #[serde(default)]
    pub truncated: bool,
}

/// Decoded file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
}

/// Payload of `GET /repos/{repo}/contents/{path}` and `/readme`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawContent {
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

/// Slim projection of a code search item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSearchHit {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawSearchResults {
    #[serde(default)]
    pub items: Vec<CodeSearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawPull {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub user: Option<RawUser>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: Option<String>,
    pub merged_at: Option<String>,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub user: Option<String>,
    pub merged: bool,
    pub state: String,
    pub created_at: Option<String>,
    pub merged_at: Option<String>,
    pub html_url: String,
}

impl From<RawPull> for PullRequestSummary {
    fn from(pr: RawPull) -> Self {
        Self {
            number: pr.number,
            title: pr.title,
            user: pr.user.map(|u| u.login),
            merged: pr.merged_at.is_some(),
            state: pr.state,
            created_at: pr.created_at,
            merged_at: pr.merged_at,
            html_url: pr.html_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawIssue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub user: Option<RawUser>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub html_url: String,
    /// Present only when the feed entry is really a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    pub number: u64,
    pub title: String,
    pub user: Option<String>,
    pub state: String,
    pub created_at: Option<String>,
    pub html_url: String,
    pub is_pr: bool,
}

impl From<RawIssue> for IssueSummary {
    fn from(issue: RawIssue) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            user: issue.user.map(|u| u.login),
            state: issue.state,
            created_at: issue.created_at,
            html_url: issue.html_url,
            is_pr: issue.pull_request.is_some(),
        }
    }
}

/// `state` filter for pull request and issue listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueState {
    Open,
    Closed,
    #[default]
    All,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl FromStr for IssueState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            other => Err(format!("state must be one of open, closed, all; got '{}'", other)),
        }
    }
}
