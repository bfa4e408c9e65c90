//! Reasoning engine boundary: an OpenAI-compatible chat-completions client.
//!
//! The agent only sees the `LlmClient` trait, so any engine that speaks
//! tool calls can be plugged in.

mod client;
mod types;

pub use client::{LlmClient, OpenAiClient};
pub use types::{ChatMessage, ChatResponse, FunctionCall, LlmError, Role, ToolCall};
