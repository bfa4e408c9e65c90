//! Code search tool.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{per_page_arg, repo_arg, repo_schema, required_str, Tool, ToolFailure};
use crate::github::GitHubClient;

const DEFAULT_PER_PAGE: u32 = 20;

/// Search file contents within the repository.
pub struct SearchCode {
    client: GitHubClient,
}

impl SearchCode {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for SearchCode {
    fn name(&self) -> &str {
        "search_code"
    }

    fn description(&self) -> &str {
        "Search file contents within the repository using GitHub code search syntax (e.g. 'Router OR route'). Returns matching file names and paths, best match first. Cheaper than reading files."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": repo_schema(),
                "query": {
                    "type": "string",
                    "description": "Search expression"
                },
                "per_page": {
                    "type": "integer",
                    "description": "Maximum results to return (default: 20, max: 100)"
                }
            },
            "required": ["repo", "query"]
        })
    }

    fn result_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "results": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "path": {"type": "string"},
                            "html_url": {"type": "string"},
                            "score": {"type": ["number", "null"]}
                        }
                    }
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolFailure> {
        let repo = repo_arg(&args)?;
        let query = required_str(&args, "query")?;
        let per_page = per_page_arg(&args, DEFAULT_PER_PAGE)?;

        let hits = self.client.search_code(&repo, query, per_page).await?;
        Ok(json!({ "results": hits }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use std::sync::Arc;

    #[tokio::test]
    async fn no_matches_is_an_empty_list() {
        let mock = Arc::new(MockTransport::new().with(
            "/search/code",
            json!({"total_count": 0, "incomplete_results": false, "items": []}),
        ));
        let tool = SearchCode::new(GitHubClient::with_transport(mock.clone()));

        let result = tool
            .execute(json!({"repo": "o/r", "query": "Router OR route"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"results": []}));
        assert_eq!(mock.requests()[0].1[1], ("per_page".to_string(), "20".to_string()));
    }

    #[tokio::test]
    async fn projects_slim_hits() {
        let mock = Arc::new(MockTransport::new().with(
            "/search/code",
            json!({"items": [{
                "name": "router.rs", "path": "src/router.rs",
                "html_url": "https://github.com/o/r/blob/main/src/router.rs",
                "score": 1.0, "sha": "abc", "repository": {"id": 1}
            }]}),
        ));
        let tool = SearchCode::new(GitHubClient::with_transport(mock));
        let result = tool
            .execute(json!({"repo": "o/r", "query": "Router", "per_page": 5}))
            .await
            .unwrap();
        let hit = &result["results"][0];
        assert_eq!(hit["path"], "src/router.rs");
        assert!(hit.get("sha").is_none());
    }
}
