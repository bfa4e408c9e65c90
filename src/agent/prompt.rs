//! Instruction policy for the research agent.

use crate::tools::ToolRegistry;

use super::transcript::{TaskPayload, Transcript, MAX_TOOL_CALLS};

pub const AGENT_NAME: &str = "GitHubResearcher";

pub const AGENT_DESCRIPTION: &str =
    "Answers questions about a GitHub repository by querying the GitHub API on demand.";

/// Build the system prompt with tool definitions.
pub fn build_system_prompt(name: &str, description: &str, tools: &ToolRegistry) -> String {
    let tool_descriptions = tools
        .list_tools()
        .iter()
        .map(|t| format!("- **{}**: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are {name}. {description}

You work like a senior engineer doing on-demand research over a GitHub repository. Nothing has been cloned or indexed; the tools below are your only view of the repository.

## Tools

{tool_descriptions}

## Rules

1. Plan briefly, then call tools.
2. Prefer targeted search and metadata (search_code, list_repo_tree, get_readme) before opening large files.
3. Be concise and factual. Cite file paths and quote short relevant snippets from files you read.
4. Only cite paths that appeared in a tool result. Never invent paths.
5. You may call at most {max_calls} tools in total. Calls beyond that are refused.
6. Stop as soon as you have enough evidence to answer.
7. If a tool fails, say what could not be retrieved. If uncertain, say what else you would check."#,
        name = name,
        description = description,
        tool_descriptions = tool_descriptions,
        max_calls = MAX_TOOL_CALLS,
    )
}

/// The user turn carrying the task payload.
pub fn build_task_message(payload: &TaskPayload, default_branch: Option<&str>) -> String {
    let body = serde_json::to_string(payload).unwrap_or_else(|_| payload.question.clone());
    match default_branch {
        Some(branch) => format!("{}\n\nThe repository's default branch is '{}'.", body, branch),
        None => body,
    }
}

pub fn budget_exhausted_notice() -> String {
    format!(
        "You have used all {} tool calls. Do not request more tools. Answer now using only the evidence gathered above, and note anything you could not retrieve.",
        MAX_TOOL_CALLS
    )
}

pub fn revision_request(unverified: &[String]) -> String {
    format!(
        "Your answer cites paths that were never returned by a tool: {}. Rewrite the answer without citing them. Do not call tools.",
        unverified.join(", ")
    )
}

/// Answer used when the engine never produced text.
pub fn fallback_answer(transcript: &Transcript) -> String {
    let fetched: Vec<String> = transcript.evidence_paths().into_iter().take(20).collect();
    let failures = transcript
        .invocations()
        .iter()
        .filter(|i| !i.result.is_success())
        .count();

    let mut answer = format!(
        "I could not reach a conclusive answer after {} tool call(s).",
        transcript.len()
    );
    if failures > 0 {
        answer.push_str(&format!(" {} of them failed.", failures));
    }
    if !fetched.is_empty() {
        answer.push_str(&format!("\n\nPaths retrieved: {}", fetched.join(", ")));
    }
    answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::transcript::ToolOutcome;
    use crate::github::{GitHubClient, RepositoryRef};
    use crate::testing::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn system_prompt_lists_tools_and_budget() {
        let tools = ToolRegistry::new(GitHubClient::with_transport(Arc::new(MockTransport::new())));
        let prompt = build_system_prompt(AGENT_NAME, AGENT_DESCRIPTION, &tools);
        assert!(prompt.starts_with("You are GitHubResearcher. Answers questions"));
        assert!(prompt.contains("- **search_code**:"));
        assert!(prompt.contains("at most 5 tools"));
    }

    #[test]
    fn task_message_carries_payload_and_branch() {
        let repo = RepositoryRef::parse("o/r").unwrap();
        let msg = build_task_message(&TaskPayload::new(&repo, "q?"), Some("develop"));
        assert!(msg.starts_with(r#"{"task":"answer_question","repo":"o/r","ref":null,"question":"q?"}"#));
        assert!(msg.ends_with("default branch is 'develop'."));
    }

    #[test]
    fn fallback_lists_evidence() {
        let mut transcript = Transcript::default();
        transcript.record(
            "get_readme",
            json!({"repo": "o/r"}),
            ToolOutcome::Success(json!({"path": "README.md", "content": "hi"})),
        );
        let text = fallback_answer(&transcript);
        assert!(text.contains("1 tool call(s)"));
        assert!(text.ends_with("Paths retrieved: README.md"));
    }
}
