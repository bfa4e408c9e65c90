//! The per-question record of tool invocations.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::github::RepositoryRef;
use crate::tools::ToolFailure;

/// Hard cap on tool invocations per question.
pub const MAX_TOOL_CALLS: usize = 5;

/// The single input unit of a run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskPayload {
    pub task: &'static str,
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub question: String,
}

impl TaskPayload {
    pub fn new(repo: &RepositoryRef, question: &str) -> Self {
        Self {
            task: "answer_question",
            repo: repo.full_name(),
            git_ref: repo.git_ref.clone(),
            question: question.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Success(Value),
    Failure(ToolFailure),
}

impl ToolOutcome {
    /// Content of the tool message returned to the engine.
    pub fn to_message(&self) -> String {
        match self {
            Self::Success(value) => value.to_string(),
            Self::Failure(failure) => failure.to_json().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<Result<Value, ToolFailure>> for ToolOutcome {
    fn from(result: Result<Value, ToolFailure>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(failure) => Self::Failure(failure),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: Value,
    pub result: ToolOutcome,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    invocations: Vec<ToolInvocation>,
    budget: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(MAX_TOOL_CALLS)
    }
}

impl Transcript {
    pub fn new(budget: usize) -> Self {
        Self {
            invocations: Vec::new(),
            budget,
        }
    }

    /// Record one invocation. Returns `false` without recording once the
    /// budget is spent.
    pub fn record(&mut self, tool_name: &str, arguments: Value, result: ToolOutcome) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.invocations.push(ToolInvocation {
            tool_name: tool_name.to_string(),
            arguments,
            result,
            timestamp: Utc::now(),
        });
        true
    }

    pub fn invocations(&self) -> &[ToolInvocation] {
        &self.invocations
    }

    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.budget.saturating_sub(self.invocations.len())
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Every `path` value found in successful results.
    pub fn evidence_paths(&self) -> BTreeSet<String> {
        let mut paths = BTreeSet::new();
        for invocation in &self.invocations {
            if let ToolOutcome::Success(value) = &invocation.result {
                collect_paths(value, &mut paths);
            }
        }
        paths
    }

    /// `path` arguments of every invocation, whether or not it succeeded.
    /// An answer may name these to report what could not be retrieved.
    pub fn requested_paths(&self) -> BTreeSet<String> {
        self.invocations
            .iter()
            .filter_map(|i| i.arguments.get("path").and_then(Value::as_str))
            .map(|p| p.trim().trim_start_matches("./").trim_start_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

fn collect_paths(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                match (key.as_str(), v) {
                    ("path", Value::String(path)) => {
                        let path = path.trim_start_matches("./").trim_start_matches('/');
                        if !path.is_empty() {
                            out.insert(path.to_string());
                        }
                    }
                    _ => collect_paths(v, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_paths(v, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FailureKind;
    use serde_json::json;

    #[test]
    fn payload_shape() {
        let repo = RepositoryRef::parse("octocat/Hello-World").unwrap();
        let payload = TaskPayload::new(&repo, " what license does this use? ");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "task": "answer_question",
                "repo": "octocat/Hello-World",
                "ref": null,
                "question": "what license does this use?"
            })
        );
    }

    #[test]
    fn budget_is_a_hard_cap() {
        let mut transcript = Transcript::new(2);
        assert!(transcript.record("get_readme", json!({}), ToolOutcome::Success(json!({}))));
        assert!(transcript.record("get_readme", json!({}), ToolOutcome::Success(json!({}))));
        assert!(transcript.is_exhausted());
        assert!(!transcript.record("get_readme", json!({}), ToolOutcome::Success(json!({}))));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn evidence_comes_only_from_successful_results() {
        let mut transcript = Transcript::default();
        transcript.record(
            "list_repo_tree",
            json!({"repo": "o/r"}),
            ToolOutcome::Success(json!({
                "total": 2,
                "files": [{"type": "blob", "path": "src/lib.rs"}],
                "dirs": [{"type": "tree", "path": "src"}]
            })),
        );
        transcript.record(
            "get_readme",
            json!({"repo": "o/r"}),
            ToolOutcome::Success(json!({"path": null, "content": ""})),
        );
        transcript.record(
            "get_file_content",
            json!({"repo": "o/r", "path": "LICENSE"}),
            ToolOutcome::Failure(ToolFailure::new(FailureKind::NotFound, "Not found")),
        );

        let paths: Vec<String> = transcript.evidence_paths().into_iter().collect();
        assert_eq!(paths, vec!["src".to_string(), "src/lib.rs".to_string()]);

        let requested: Vec<String> = transcript.requested_paths().into_iter().collect();
        assert_eq!(requested, vec!["LICENSE".to_string()]);
    }
}
