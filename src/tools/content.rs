//! README and single-file content.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ref_schema, repo_arg, repo_schema, required_str, Tool, ToolFailure};
use crate::github::{FileRecord, GitHubClient};

/// Content handed to the engine is cut at this many characters.
pub const MAX_CONTENT_CHARS: usize = 60_000;

fn content_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "path": {"type": ["string", "null"]},
            "content": {"type": "string"},
            "size": {"type": "integer"},
            "truncated": {"type": "boolean"}
        }
    })
}

fn file_result(file: FileRecord) -> Value {
    let size = file.content.len();
    let truncated = file.content.chars().count() > MAX_CONTENT_CHARS;
    let content = if truncated {
        file.content.chars().take(MAX_CONTENT_CHARS).collect()
    } else {
        file.content
    };
    json!({
        "path": file.path,
        "content": content,
        "size": size,
        "truncated": truncated,
    })
}

/// Fetch the README, if any.
pub struct GetReadme {
    client: GitHubClient,
}

impl GetReadme {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetReadme {
    fn name(&self) -> &str {
        "get_readme"
    }

    fn description(&self) -> &str {
        "Fetch the repository README. Returns a null path and empty content when there is none."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": repo_schema()
            },
            "required": ["repo"]
        })
    }

    fn result_schema(&self) -> Value {
        content_schema()
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolFailure> {
        let repo = repo_arg(&args)?;
        match self.client.get_readme(&repo).await {
            Some(readme) => Ok(file_result(readme)),
            None => Ok(json!({ "path": null, "content": "", "size": 0, "truncated": false })),
        }
    }
}

/// Read one file by path.
pub struct GetFileContent {
    client: GitHubClient,
}

impl GetFileContent {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetFileContent {
    fn name(&self) -> &str {
        "get_file_content"
    }

    fn description(&self) -> &str {
        "Read a specific file by its path in the repository. Large files are truncated."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": repo_schema(),
                "path": {
                    "type": "string",
                    "description": "File path relative to the repository root"
                },
                "ref": ref_schema()
            },
            "required": ["repo", "path"]
        })
    }

    fn result_schema(&self) -> Value {
        content_schema()
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolFailure> {
        let repo = repo_arg(&args)?;
        let path = required_str(&args, "path")?;
        let file = self.client.get_file(&repo, path).await?;
        Ok(file_result(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use crate::tools::FailureKind;
    use std::sync::Arc;

    #[tokio::test]
    async fn absent_readme_is_empty_not_an_error() {
        let tool = GetReadme::new(GitHubClient::with_transport(Arc::new(MockTransport::new())));
        let result = tool.execute(json!({"repo": "o/r"})).await.unwrap();
        assert_eq!(result["path"], Value::Null);
        assert_eq!(result["content"], "");
    }

    #[tokio::test]
    async fn nonexistent_path_is_not_found() {
        let tool = GetFileContent::new(GitHubClient::with_transport(Arc::new(MockTransport::new())));
        let err = tool
            .execute(json!({"repo": "o/r", "path": "does/not/exist.rs"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::NotFound);
    }

    #[tokio::test]
    async fn missing_path_argument_is_rejected() {
        let tool = GetFileContent::new(GitHubClient::with_transport(Arc::new(MockTransport::new())));
        let err = tool.execute(json!({"repo": "o/r"})).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidArguments);
    }

    #[test]
    fn long_content_is_truncated_on_char_boundary() {
        let content = "é".repeat(MAX_CONTENT_CHARS + 10);
        let result = file_result(FileRecord {
            path: "big.txt".to_string(),
            content: content.clone(),
        });
        assert_eq!(result["truncated"], true);
        assert_eq!(result["size"], content.len());
        assert_eq!(result["content"].as_str().unwrap().chars().count(), MAX_CONTENT_CHARS);
    }
}
