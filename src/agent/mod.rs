//! Agent module - the bounded research loop.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Check the credential against the repository, then build the prompt
//! 2. Call the engine with the read-only toolset
//! 3. Execute requested tool calls and feed results back, at most 5 in total
//! 4. Once the budget is spent, demand an answer with tools withdrawn
//! 5. Check the answer's citations against what the tools returned

mod agent_loop;
mod citations;
mod prompt;
mod transcript;

pub use agent_loop::{Agent, AgentError, Answer};
pub use citations::{cited_paths, unverified_paths};
pub use prompt::build_system_prompt;
pub use transcript::{TaskPayload, ToolInvocation, ToolOutcome, Transcript, MAX_TOOL_CALLS};
