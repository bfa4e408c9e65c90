//! GitHub data access client.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::decode::decode;
use super::error::GitHubError;
use super::transport::{HttpTransport, Transport};
use super::types::{
    CodeSearchHit, FileRecord, IssueState, IssueSummary, PullRequestSummary, RawContent, RawIssue,
    RawPull, RawSearchResults, RepoMetadata, RepoTree, RepositoryRef,
};

/// Used when the repository metadata carries no `default_branch`.
pub const FALLBACK_BRANCH: &str = "main";

/// Upper bound GitHub accepts for `per_page`.
const MAX_PER_PAGE: u32 = 100;

/// Search qualifiers that could widen the mandatory single-repository scope.
const SCOPE_QUALIFIERS: [&str; 5] = ["repo:", "org:", "user:", "in:", "is:"];

/// Stateless, read-only client. Every method issues one request, except
/// `get_readme` (two) and `get_tree` without a ref (two).
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn Transport>,
}

impl GitHubClient {
    /// Create a client against the public API.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::MissingToken` when `token` is empty.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(token)?)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GitHubError> {
        let value = self.transport.get_json(path, query).await?;
        serde_json::from_value(value).map_err(|e| GitHubError::Malformed(format!("{}: {}", path, e)))
    }

    /// Repository metadata (`GET /repos/{repo}`).
    pub async fn repo_metadata(&self, repo: &RepositoryRef) -> Result<RepoMetadata, GitHubError> {
        self.get(&format!("/repos/{}", repo.full_name()), &[]).await
    }

    /// Resolve the repository's default branch.
    ///
    /// HTTP failures propagate; only a missing or blank `default_branch`
    /// field falls back to `main`.
    pub async fn resolve_default_branch(&self, repo: &RepositoryRef) -> Result<String, GitHubError> {
        let meta = self.repo_metadata(repo).await?;
        match meta.default_branch.filter(|b| !b.trim().is_empty()) {
            Some(branch) => Ok(branch),
            None => {
                tracing::warn!(
                    "{} reported no default branch, assuming '{}'",
                    repo,
                    FALLBACK_BRANCH
                );
                Ok(FALLBACK_BRANCH.to_string())
            }
        }
    }

    /// Flattened recursive tree at `repo.git_ref`, or at the default branch.
    pub async fn get_tree(&self, repo: &RepositoryRef) -> Result<RepoTree, GitHubError> {
        let git_ref = match &repo.git_ref {
            Some(r) => r.clone(),
            None => self.resolve_default_branch(repo).await?,
        };

        let tree: RepoTree = self
            .get(
                &format!(
                    "/repos/{}/git/trees/{}",
                    repo.full_name(),
                    urlencoding::encode(&git_ref)
                ),
                &[("recursive", "1".to_string())],
            )
            .await?;

        if tree.truncated {
            tracing::warn!("Upstream truncated the tree listing for {}@{}", repo, git_ref);
        }
        Ok(tree)
    }

    /// The repository README, or `None` if it is absent or cannot be read.
    pub async fn get_readme(&self, repo: &RepositoryRef) -> Option<FileRecord> {
        match self.fetch_readme(repo).await {
            Ok(readme) => Some(readme),
            Err(e) => {
                tracing::warn!("No README for {}: {}", repo, e);
                None
            }
        }
    }

    async fn fetch_readme(&self, repo: &RepositoryRef) -> Result<FileRecord, GitHubError> {
        let located: RawContent = self.get(&format!("/repos/{}/readme", repo.full_name()), &[]).await?;
        let file: RawContent = self
            .get(&contents_path(repo, &located.path), &[])
            .await?;
        Ok(FileRecord {
            path: located.path,
            content: decode(&file.content, &file.encoding),
        })
    }

    /// A single file. Without a ref the API picks its own default.
    pub async fn get_file(&self, repo: &RepositoryRef, path: &str) -> Result<FileRecord, GitHubError> {
        let query: Vec<(&str, String)> = repo
            .git_ref
            .iter()
            .map(|r| ("ref", r.clone()))
            .collect();

        let value = self.transport.get_json(&contents_path(repo, path), &query).await?;
        // Directories come back as arrays.
        if value.is_array() {
            return Err(GitHubError::Malformed(format!("'{}' is a directory, not a file", path)));
        }
        let file: RawContent = serde_json::from_value(value)
            .map_err(|e| GitHubError::Malformed(format!("{}: {}", path, e)))?;

        Ok(FileRecord {
            path: path.to_string(),
            content: decode(&file.content, &file.encoding),
        })
    }

    /// Code search restricted to file contents of this repository.
    pub async fn search_code(
        &self,
        repo: &RepositoryRef,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<CodeSearchHit>, GitHubError> {
        let terms = strip_scope_qualifiers(query);
        if terms.is_empty() {
            tracing::warn!("Search query '{}' has no terms left after scoping", query);
            return Ok(Vec::new());
        }

        let q = format!("{} repo:{} in:file", terms, repo.full_name());
        let results: RawSearchResults = self
            .get(
                "/search/code",
                &[("q", q), ("per_page", clamp_per_page(per_page).to_string())],
            )
            .await?;
        Ok(results.items)
    }

    /// Most recent pull requests first.
    pub async fn get_prs(
        &self,
        repo: &RepositoryRef,
        state: IssueState,
        per_page: u32,
    ) -> Result<Vec<PullRequestSummary>, GitHubError> {
        let pulls: Vec<RawPull> = self
            .get(
                &format!("/repos/{}/pulls", repo.full_name()),
                &listing_query(state, per_page),
            )
            .await?;
        Ok(pulls.into_iter().map(PullRequestSummary::from).collect())
    }

    /// Most recent issues first. The feed also contains pull requests.
    pub async fn get_issues(
        &self,
        repo: &RepositoryRef,
        state: IssueState,
        per_page: u32,
    ) -> Result<Vec<IssueSummary>, GitHubError> {
        let issues: Vec<RawIssue> = self
            .get(
                &format!("/repos/{}/issues", repo.full_name()),
                &listing_query(state, per_page),
            )
            .await?;
        Ok(issues.into_iter().map(IssueSummary::from).collect())
    }
}

fn contents_path(repo: &RepositoryRef, path: &str) -> String {
    let encoded: Vec<String> = path
        .trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/repos/{}/contents/{}", repo.full_name(), encoded.join("/"))
}

fn listing_query(state: IssueState, per_page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("state", state.as_str().to_string()),
        ("per_page", clamp_per_page(per_page).to_string()),
    ]
}

fn clamp_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, MAX_PER_PAGE)
}

/// Drop every term carrying a scope qualifier, including ones wrapped in
/// grouping or negation such as `(repo:x/y)` or `-org:x`.
fn strip_scope_qualifiers(query: &str) -> String {
    query
        .split_whitespace()
        .filter(|term| !has_scope_qualifier(&term.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_scope_qualifier(term: &str) -> bool {
    SCOPE_QUALIFIERS.iter().any(|q| {
        term.match_indices(q).any(|(i, _)| {
            term[..i]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_ascii_alphanumeric())
        })
    })
}
