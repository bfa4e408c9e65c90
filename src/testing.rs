//! In-memory doubles for the two network seams.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::github::{GitHubError, Transport};
use crate::llm::{ChatMessage, ChatResponse, FunctionCall, LlmClient, LlmError, ToolCall};

/// Canned responses keyed by request path. Unknown paths are 404s.
#[derive(Default)]
pub struct MockTransport {
    responses: HashMap<String, Result<Value, GitHubError>>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), Ok(body));
        self
    }

    pub fn with_error(mut self, path: &str, error: GitHubError) -> Self {
        self.responses.insert(path.to_string(), Err(error));
        self
    }

    /// Every request made so far as `(path, query)`.
    pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|(path, _)| path).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, GitHubError> {
        self.requests.lock().unwrap().push((
            path.to_string(),
            query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        ));
        self.responses.get(path).cloned().unwrap_or_else(|| {
            Err(GitHubError::NotFound {
                resource: path.to_string(),
            })
        })
    }
}

/// What the engine was asked on one turn.
#[derive(Debug, Clone)]
pub struct RecordedTurn {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools_offered: bool,
}

/// Replays queued engine decisions. Once the queue is empty it answers
/// with a fixed text.
#[derive(Default)]
pub struct ScriptedLlm {
    script: Mutex<VecDeque<ChatResponse>>,
    turns: Mutex<Vec<RecordedTurn>>,
}

impl ScriptedLlm {
    pub fn new(script: Vec<ChatResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            turns: Mutex::default(),
        }
    }

    pub fn turns(&self) -> Vec<RecordedTurn> {
        self.turns.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
    ) -> Result<ChatResponse, LlmError> {
        self.turns.lock().unwrap().push(RecordedTurn {
            model: model.to_string(),
            messages: messages.to_vec(),
            tools_offered: tools.is_some(),
        });
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| answer("No further evidence needed.")))
    }
}

/// An engine turn requesting the given calls, as `(name, arguments)`.
pub fn call_tools(calls: &[(&str, Value)]) -> ChatResponse {
    ChatResponse {
        content: None,
        tool_calls: Some(
            calls
                .iter()
                .enumerate()
                .map(|(i, (name, args))| ToolCall {
                    id: format!("call_{}_{}", name, i),
                    call_type: "function".to_string(),
                    function: FunctionCall {
                        name: name.to_string(),
                        arguments: args.to_string(),
                    },
                })
                .collect(),
        ),
        finish_reason: Some("tool_calls".to_string()),
    }
}

/// An engine turn with a final text answer.
pub fn answer(text: &str) -> ChatResponse {
    ChatResponse {
        content: Some(text.to_string()),
        tool_calls: None,
        finish_reason: Some("stop".to_string()),
    }
}
