//! Pull request and issue listings.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{per_page_arg, repo_arg, repo_schema, state_arg, Tool, ToolFailure};
use crate::github::GitHubClient;

const DEFAULT_PER_PAGE: u32 = 25;

fn listing_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "repo": repo_schema(),
            "state": {
                "type": "string",
                "enum": ["open", "closed", "all"],
                "description": "Filter by state (default: all)"
            },
            "per_page": {
                "type": "integer",
                "description": "Maximum entries to return (default: 25, max: 100)"
            }
        },
        "required": ["repo"]
    })
}

/// List recent pull requests.
pub struct GetPrs {
    client: GitHubClient,
}

impl GetPrs {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetPrs {
    fn name(&self) -> &str {
        "get_prs"
    }

    fn description(&self) -> &str {
        "List recent pull requests, newest first, with author, state and merge status."
    }

    fn parameters_schema(&self) -> Value {
        listing_parameters()
    }

    fn result_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pull_requests": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "number": {"type": "integer"},
                            "title": {"type": "string"},
                            "user": {"type": ["string", "null"]},
                            "merged": {"type": "boolean"},
                            "state": {"type": "string"},
                            "created_at": {"type": ["string", "null"]},
                            "merged_at": {"type": ["string", "null"]},
                            "html_url": {"type": "string"}
                        }
                    }
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolFailure> {
        let repo = repo_arg(&args)?;
        let state = state_arg(&args)?;
        let per_page = per_page_arg(&args, DEFAULT_PER_PAGE)?;

        let prs = self.client.get_prs(&repo, state, per_page).await?;
        Ok(json!({ "pull_requests": prs }))
    }
}

/// List recent issues.
pub struct GetIssues {
    client: GitHubClient,
}

impl GetIssues {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetIssues {
    fn name(&self) -> &str {
        "get_issues"
    }

    fn description(&self) -> &str {
        "List recent issues, newest first. Pull requests also appear in this feed and are flagged with is_pr."
    }

    fn parameters_schema(&self) -> Value {
        listing_parameters()
    }

    fn result_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issues": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "number": {"type": "integer"},
                            "title": {"type": "string"},
                            "user": {"type": ["string", "null"]},
                            "state": {"type": "string"},
                            "created_at": {"type": ["string", "null"]},
                            "html_url": {"type": "string"},
                            "is_pr": {"type": "boolean"}
                        }
                    }
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolFailure> {
        let repo = repo_arg(&args)?;
        let state = state_arg(&args)?;
        let per_page = per_page_arg(&args, DEFAULT_PER_PAGE)?;

        let issues = self.client.get_issues(&repo, state, per_page).await?;
        Ok(json!({ "issues": issues }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use crate::tools::FailureKind;
    use std::sync::Arc;

    #[tokio::test]
    async fn issues_default_to_all_states() {
        let mock = Arc::new(MockTransport::new().with(
            "/repos/o/r/issues",
            json!([{"number": 3, "title": "t", "user": {"login": "u"}, "state": "open",
                    "created_at": "2024-05-01T00:00:00Z", "html_url": "h",
                    "pull_request": {"url": "p"}}]),
        ));
        let tool = GetIssues::new(GitHubClient::with_transport(mock.clone()));

        let result = tool.execute(json!({"repo": "o/r"})).await.unwrap();
        assert_eq!(result["issues"][0]["is_pr"], true);
        assert_eq!(
            mock.requests()[0].1,
            vec![
                ("state".to_string(), "all".to_string()),
                ("per_page".to_string(), "25".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn prs_reject_unknown_state_without_a_request() {
        let mock = Arc::new(MockTransport::new());
        let tool = GetPrs::new(GitHubClient::with_transport(mock.clone()));

        let err = tool
            .execute(json!({"repo": "o/r", "state": "merged"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidArguments);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn upstream_status_is_reported() {
        let mock = Arc::new(MockTransport::new().with_error(
            "/repos/o/r/pulls",
            crate::github::GitHubError::Status {
                status: 502,
                message: "Bad Gateway".to_string(),
            },
        ));
        let tool = GetPrs::new(GitHubClient::with_transport(mock));
        let err = tool.execute(json!({"repo": "o/r"})).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Upstream);
        assert_eq!(err.status, Some(502));
    }
}
