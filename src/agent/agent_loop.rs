//! Core agent loop implementation.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;

use crate::config::Config;
use crate::github::{GitHubClient, GitHubError, RepositoryRef};
use crate::llm::{ChatMessage, LlmClient, LlmError, OpenAiClient, Role, ToolCall};
use crate::tools::{FailureKind, ToolFailure, ToolRegistry};

use super::citations::{redact, unverified_paths};
use super::prompt::{
    budget_exhausted_notice, build_system_prompt, build_task_message, fallback_answer,
    revision_request, AGENT_DESCRIPTION, AGENT_NAME,
};
use super::transcript::{TaskPayload, ToolOutcome, Transcript, MAX_TOOL_CALLS};

/// Engine turns allowed per question: one per tool call plus room for the
/// forced final answer.
const MAX_ENGINE_TURNS: usize = MAX_TOOL_CALLS + 3;

#[derive(Debug, Error)]
pub enum AgentError {
    /// The repository API rejected the credential before any planning.
    #[error("GitHub rejected the credential: {0}")]
    Unauthorized(String),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Reasoning engine error: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),
}

/// Result of one question.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub transcript: Transcript,
    /// The engine asked for more tools than the budget allowed.
    pub budget_exhausted: bool,
    /// Paths removed from the answer because no tool returned them.
    pub redacted: Vec<String>,
}

/// The research agent.
pub struct Agent {
    name: String,
    description: String,
    model: String,
    llm: Arc<dyn LlmClient>,
    github: GitHubClient,
    tools: ToolRegistry,
}

impl Agent {
    /// Create an agent talking to GitHub and the configured engine.
    pub fn new(config: &Config) -> Result<Self, AgentError> {
        let github = GitHubClient::new(&config.github_token)?;
        let llm = Arc::new(OpenAiClient::new(&config.llm_api_key, &config.llm_base_url)?);
        Ok(Self::with_clients(&config.model, llm, github))
    }

    pub fn with_clients(model: &str, llm: Arc<dyn LlmClient>, github: GitHubClient) -> Self {
        let tools = ToolRegistry::new(github.clone());
        Self {
            name: AGENT_NAME.to_string(),
            description: AGENT_DESCRIPTION.to_string(),
            model: model.to_string(),
            llm,
            github,
            tools,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer one question.
    pub async fn run(&self, payload: &TaskPayload) -> Result<Answer, AgentError> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("question", %run_id, repo = %payload.repo);
        self.run_inner(payload).instrument(span).await
    }

    async fn run_inner(&self, payload: &TaskPayload) -> Result<Answer, AgentError> {
        let repo = RepositoryRef::parse(&payload.repo)
            .map_err(AgentError::InvalidTask)?
            .with_ref(payload.git_ref.as_deref());
        if payload.question.trim().is_empty() {
            return Err(AgentError::InvalidTask("Question is empty".to_string()));
        }

        let default_branch = self.preflight(&repo).await?;
        tracing::info!("{} answering with model {}", self.name, self.model);

        let mut messages = vec![
            ChatMessage::system(build_system_prompt(&self.name, &self.description, &self.tools)),
            ChatMessage::user(build_task_message(payload, default_branch.as_deref())),
        ];
        let tool_schemas = self.tools.get_tool_schemas();

        let mut transcript = Transcript::new(MAX_TOOL_CALLS);
        let mut budget_exhausted = false;
        let mut notice_sent = false;
        let mut final_text = None;

        for turn in 0..MAX_ENGINE_TURNS {
            tracing::debug!("Agent turn {} ({} tool calls left)", turn + 1, transcript.remaining());

            let tools = (!transcript.is_exhausted()).then_some(tool_schemas.as_slice());
            let response = self.llm.chat_completion(&self.model, &messages, tools).await?;
            tracing::debug!("Engine finished turn with {:?}", response.finish_reason);

            if response.has_tool_calls() {
                let tool_calls = response.tool_calls.unwrap_or_default();
                messages.push(ChatMessage {
                    role: Role::Assistant,
                    content: response.content,
                    tool_calls: Some(tool_calls.clone()),
                    tool_call_id: None,
                });

                for tool_call in &tool_calls {
                    let outcome = if transcript.is_exhausted() {
                        budget_exhausted = true;
                        tracing::warn!(
                            "Refusing {}: tool budget of {} spent",
                            tool_call.function.name,
                            MAX_TOOL_CALLS
                        );
                        ToolOutcome::Failure(ToolFailure::new(
                            FailureKind::BudgetExceeded,
                            format!("Tool budget of {} calls is spent", MAX_TOOL_CALLS),
                        ))
                    } else {
                        let (args, outcome) = self.dispatch(&repo, tool_call).await;
                        transcript.record(&tool_call.function.name, args, outcome.clone());
                        outcome
                    };
                    messages.push(ChatMessage::tool_result(&tool_call.id, outcome.to_message()));
                }

                if transcript.is_exhausted() && !notice_sent {
                    messages.push(ChatMessage::user(budget_exhausted_notice()));
                    notice_sent = true;
                }
                continue;
            }

            match response.content.filter(|c| !c.trim().is_empty()) {
                Some(text) => final_text = Some(text),
                None => tracing::warn!("Engine returned neither tool calls nor text"),
            }
            break;
        }

        let mut text = match final_text {
            Some(text) => text,
            None => {
                tracing::warn!("No answer from engine, falling back to an evidence summary");
                fallback_answer(&transcript)
            }
        };

        let redacted = self.enforce_citations(&repo, &transcript, &mut messages, &mut text).await;

        tracing::info!(
            "Answered after {} tool call(s){}",
            transcript.len(),
            if budget_exhausted { ", budget exhausted" } else { "" }
        );

        Ok(Answer {
            text,
            transcript,
            budget_exhausted,
            redacted,
        })
    }

    /// Fetch repository metadata once. Only a rejected credential is fatal.
    async fn preflight(&self, repo: &RepositoryRef) -> Result<Option<String>, AgentError> {
        match self.github.repo_metadata(repo).await {
            Ok(meta) => {
                tracing::debug!(
                    "Preflight ok for {} (private: {}, default branch: {:?})",
                    meta.full_name,
                    meta.private,
                    meta.default_branch
                );
                Ok(meta.default_branch)
            }
            Err(e) if e.is_auth_failure() => Err(AgentError::Unauthorized(e.to_string())),
            Err(e) => {
                tracing::warn!("Could not read metadata for {}: {}", repo, e);
                Ok(None)
            }
        }
    }

    /// Execute one tool call, scoped to the task's repository.
    async fn dispatch(&self, repo: &RepositoryRef, tool_call: &ToolCall) -> (Value, ToolOutcome) {
        let name = tool_call.function.name.as_str();
        let raw = tool_call.function.arguments.trim();

        let mut args: Value = if raw.is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(raw) {
                Ok(args) => args,
                Err(e) => {
                    let failure = ToolFailure::invalid_arguments(format!("Arguments are not valid JSON: {}", e));
                    return (Value::String(raw.to_string()), ToolOutcome::Failure(failure));
                }
            }
        };

        let Some(obj) = args.as_object_mut() else {
            let failure = ToolFailure::invalid_arguments("Arguments must be a JSON object");
            return (args, ToolOutcome::Failure(failure));
        };

        match obj.get("repo").and_then(Value::as_str).map(RepositoryRef::parse) {
            None => {
                obj.insert("repo".to_string(), Value::String(repo.full_name()));
            }
            Some(Ok(requested)) if !requested.same_repo(repo) => {
                let failure = ToolFailure::new(
                    FailureKind::OutOfScope,
                    format!("Only {} may be queried, not {}", repo, requested),
                );
                return (args, ToolOutcome::Failure(failure));
            }
            // Malformed identifiers are reported by the tool itself.
            Some(_) => {}
        }

        // `"ref": null` or a blank ref from the engine still gets the task ref.
        let has_ref = obj
            .get("ref")
            .and_then(Value::as_str)
            .is_some_and(|r| !r.trim().is_empty());
        if let (Some(git_ref), false) = (&repo.git_ref, has_ref) {
            let accepts_ref = self
                .tools
                .get(name)
                .is_some_and(|t| t.parameters_schema()["properties"].get("ref").is_some());
            if accepts_ref {
                obj.insert("ref".to_string(), Value::String(git_ref.clone()));
            }
        }

        tracing::info!("Calling tool: {} with args: {}", name, args);
        let outcome = ToolOutcome::from(self.tools.execute(name, args.clone()).await);
        if let ToolOutcome::Failure(failure) = &outcome {
            tracing::warn!("Tool {} failed: {}", name, failure.message);
        }
        (args, outcome)
    }

    /// Make sure the answer cites only retrieved paths (or paths it tried
    /// and failed to read). One tool-less revision is requested; anything
    /// still unverified is redacted.
    async fn enforce_citations(
        &self,
        repo: &RepositoryRef,
        transcript: &Transcript,
        messages: &mut Vec<ChatMessage>,
        text: &mut String,
    ) -> Vec<String> {
        let mut evidence = transcript.evidence_paths();
        evidence.extend(transcript.requested_paths());
        let repo_name = repo.full_name();

        let unverified = unverified_paths(text, &evidence, &repo_name);
        if unverified.is_empty() {
            return Vec::new();
        }
        tracing::warn!("Answer cites unretrieved paths: {}", unverified.join(", "));

        messages.push(ChatMessage {
            role: Role::Assistant,
            content: Some(text.clone()),
            tool_calls: None,
            tool_call_id: None,
        });
        messages.push(ChatMessage::user(revision_request(&unverified)));

        match self.llm.chat_completion(&self.model, messages.as_slice(), None).await {
            Ok(response) => {
                if let Some(revised) = response.content.filter(|c| !c.trim().is_empty()) {
                    *text = revised;
                }
            }
            Err(e) => tracing::warn!("Revision request failed: {}", e),
        }

        let remaining = unverified_paths(text, &evidence, &repo_name);
        if !remaining.is_empty() {
            tracing::warn!("Redacting unverified paths: {}", remaining.join(", "));
            *text = redact(text, &remaining);
        }
        remaining
    }
}
