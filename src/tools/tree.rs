//! Repository tree listing.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ref_schema, repo_arg, repo_schema, Tool, ToolFailure};
use crate::github::{EntryKind, GitHubClient, TreeEntry};

/// Cap on files and on directories returned, each.
pub const MAX_TREE_ENTRIES: usize = 500;

/// List every file and directory in the repository.
pub struct ListRepoTree {
    client: GitHubClient,
}

impl ListRepoTree {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListRepoTree {
    fn name(&self) -> &str {
        "list_repo_tree"
    }

    fn description(&self) -> &str {
        "List the repository tree. Returns up to 500 file paths and 500 directory paths, plus the total number of entries."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": repo_schema(),
                "ref": ref_schema()
            },
            "required": ["repo"]
        })
    }

    fn result_schema(&self) -> Value {
        let entry = json!({
            "type": "object",
            "properties": {
                "type": {"type": "string"},
                "path": {"type": "string"}
            }
        });
        json!({
            "type": "object",
            "properties": {
                "total": {"type": "integer"},
                "files": {"type": "array", "items": entry},
                "dirs": {"type": "array", "items": entry},
                "upstream_truncated": {"type": "boolean"}
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolFailure> {
        let repo = repo_arg(&args)?;
        let tree = self.client.get_tree(&repo).await?;

        let of_kind = |kind: EntryKind| -> Vec<&TreeEntry> {
            tree.entries
                .iter()
                .filter(|e| e.kind == kind)
                .take(MAX_TREE_ENTRIES)
                .collect()
        };

        Ok(json!({
            "total": tree.entries.len(),
            "files": of_kind(EntryKind::Blob),
            "dirs": of_kind(EntryKind::Tree),
            "upstream_truncated": tree.truncated,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use std::sync::Arc;

    #[tokio::test]
    async fn caps_files_and_dirs_but_reports_true_total() {
        let mut entries: Vec<Value> = (0..10_000)
            .map(|i| json!({"type": "blob", "path": format!("src/f{}.rs", i), "mode": "100644"}))
            .collect();
        entries.extend((0..600).map(|i| json!({"type": "tree", "path": format!("d{}", i)})));

        let mock = Arc::new(MockTransport::new().with(
            "/repos/o/r/git/trees/main",
            json!({"tree": entries, "truncated": false}),
        ));
        let tool = ListRepoTree::new(GitHubClient::with_transport(mock.clone()));

        let result = tool.execute(json!({"repo": "o/r", "ref": "main"})).await.unwrap();
        assert_eq!(result["total"], 10_600);
        assert_eq!(result["files"].as_array().unwrap().len(), 500);
        assert_eq!(result["dirs"].as_array().unwrap().len(), 500);
        assert_eq!(result["files"][0], json!({"type": "blob", "path": "src/f0.rs"}));
        assert_eq!(result["upstream_truncated"], false);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn inaccessible_repo_is_a_failure_result() {
        let tool = ListRepoTree::new(GitHubClient::with_transport(Arc::new(MockTransport::new())));
        let err = tool.execute(json!({"repo": "o/r"})).await.unwrap_err();
        assert_eq!(err.kind, crate::tools::FailureKind::NotFound);
    }
}
