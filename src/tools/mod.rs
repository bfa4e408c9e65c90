//! Tool contract layer: the read-only capabilities the agent may invoke.
//!
//! Each tool is a thin projection of one `GitHubClient` call. Tools never
//! retry, never chain extra requests, and report failures as a
//! `ToolFailure` value instead of an error that would end the run.

mod activity;
mod content;
mod search;
mod tree;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::github::{GitHubClient, GitHubError, IssueState, RepositoryRef};

pub use activity::{GetIssues, GetPrs};
pub use content::{GetFileContent, GetReadme, MAX_CONTENT_CHARS};
pub use search::SearchCode;
pub use tree::{ListRepoTree, MAX_TREE_ENTRIES};

/// A named, schema-bound capability.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments.
    fn parameters_schema(&self) -> Value;

    /// JSON schema of a successful result.
    fn result_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<Value, ToolFailure>;
}

/// Why a tool call produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Upstream,
    InvalidArguments,
    UnknownTool,
    OutOfScope,
    BudgetExceeded,
}

/// Structured failure handed back to the reasoning engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ToolFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidArguments, message)
    }

    /// Body of the tool message sent back to the engine.
    pub fn to_json(&self) -> Value {
        json!({ "error": self })
    }
}

impl From<GitHubError> for ToolFailure {
    fn from(e: GitHubError) -> Self {
        let kind = match e {
            GitHubError::NotFound { .. } => FailureKind::NotFound,
            _ => FailureKind::Upstream,
        };
        Self {
            kind,
            status: e.status(),
            message: e.to_string(),
        }
    }
}

/// Name and description of a registered tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// The fixed, read-only toolset.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Register every repository tool against `client`.
    pub fn new(client: GitHubClient) -> Self {
        let tools: Vec<Box<dyn Tool>> = vec![
            Box::new(ListRepoTree::new(client.clone())),
            Box::new(GetReadme::new(client.clone())),
            Box::new(SearchCode::new(client.clone())),
            Box::new(GetFileContent::new(client.clone())),
            Box::new(GetPrs::new(client.clone())),
            Box::new(GetIssues::new(client)),
        ];
        Self { tools }
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Tool definitions in chat-completions `tools` format.
    pub fn get_tool_schemas(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.parameters_schema(),
                    }
                })
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, ToolFailure> {
        match self.get(name) {
            Some(tool) => tool.execute(args).await,
            None => Err(ToolFailure::new(
                FailureKind::UnknownTool,
                format!("Unknown tool: {}", name),
            )),
        }
    }
}

// Argument helpers shared by the tool implementations.

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolFailure> {
    args[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolFailure::invalid_arguments(format!("Missing '{}' argument", key)))
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args[key].as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// `repo` plus the optional `ref` argument.
fn repo_arg(args: &Value) -> Result<RepositoryRef, ToolFailure> {
    let repo = RepositoryRef::parse(required_str(args, "repo")?).map_err(ToolFailure::invalid_arguments)?;
    Ok(repo.with_ref(optional_str(args, "ref")))
}

/// Accepts integers or numeric strings; models send both.
fn per_page_arg(args: &Value, default: u32) -> Result<u32, ToolFailure> {
    match &args["per_page"] {
        Value::Null => Ok(default),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .map(|n| n.min(u64::from(u32::MAX)) as u32)
            .ok_or_else(|| ToolFailure::invalid_arguments("per_page must be a positive integer")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ToolFailure::invalid_arguments("per_page must be a positive integer")),
        _ => Err(ToolFailure::invalid_arguments("per_page must be a positive integer")),
    }
}

fn state_arg(args: &Value) -> Result<IssueState, ToolFailure> {
    optional_str(args, "state")
        .map(|s| s.parse().map_err(ToolFailure::invalid_arguments))
        .transpose()
        .map(Option::unwrap_or_default)
}

fn repo_schema() -> Value {
    json!({
        "type": "string",
        "description": "Repository as 'owner/name'"
    })
}

fn ref_schema() -> Value {
    json!({
        "type": "string",
        "description": "Optional branch, tag or commit SHA"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use std::sync::Arc;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(GitHubClient::with_transport(Arc::new(MockTransport::new())))
    }

    #[test]
    fn registers_exactly_the_read_only_tools() {
        let names: Vec<String> = registry().list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "list_repo_tree",
                "get_readme",
                "search_code",
                "get_file_content",
                "get_prs",
                "get_issues",
            ]
        );
    }

    #[test]
    fn schemas_are_function_definitions_requiring_repo() {
        for schema in registry().get_tool_schemas() {
            assert_eq!(schema["type"], "function");
            let required = schema["function"]["parameters"]["required"]
                .as_array()
                .unwrap();
            assert!(required.contains(&json!("repo")));
        }
    }

    #[test]
    fn every_tool_declares_a_result_schema() {
        let reg = registry();
        for info in reg.list_tools() {
            let schema = reg.get(&info.name).unwrap().result_schema();
            assert_eq!(schema["type"], "object", "{}", info.name);
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_a_structured_failure() {
        let err = registry()
            .execute("delete_branch", json!({"repo": "a/b"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::UnknownTool);
        assert_eq!(err.to_json()["error"]["kind"], "unknown_tool");
    }

    #[test]
    fn github_errors_map_to_failure_kinds() {
        let nf = ToolFailure::from(GitHubError::NotFound {
            resource: "/x".to_string(),
        });
        assert_eq!(nf.kind, FailureKind::NotFound);
        assert_eq!(nf.status, Some(404));

        let timeout = ToolFailure::from(GitHubError::Timeout(30));
        assert_eq!(timeout.kind, FailureKind::Upstream);
        assert_eq!(timeout.status, None);
    }

    #[test]
    fn argument_helpers() {
        let args = json!({"repo": "o/r", "ref": " ", "per_page": "7", "state": "Open"});
        let repo = repo_arg(&args).unwrap();
        assert_eq!(repo.git_ref, None);
        assert_eq!(per_page_arg(&args, 20).unwrap(), 7);
        assert_eq!(state_arg(&args).unwrap(), IssueState::Open);

        assert_eq!(per_page_arg(&json!({}), 20).unwrap(), 20);
        assert!(per_page_arg(&json!({"per_page": -1}), 20).is_err());
        assert_eq!(per_page_arg(&json!({"per_page": 20.0}), 5).unwrap(), 20);
        assert!(per_page_arg(&json!({"per_page": 2.5}), 5).is_err());
        assert_eq!(state_arg(&json!({})).unwrap(), IssueState::All);
        assert!(state_arg(&json!({"state": "merged"})).is_err());
        assert!(repo_arg(&json!({"repo": "nope"})).is_err());
    }
}
