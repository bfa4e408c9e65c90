//! # agentic-search
//!
//! Answers natural-language questions about a GitHub repository without
//! cloning or indexing it. A reasoning engine decides, step by step, which
//! read-only GitHub API queries to issue, then answers from the results.
//!
//! ## Architecture
//!
//! - [`github`]: read-only data access, decoded into slim records
//! - [`tools`]: each data access operation as a schema-bound tool
//! - [`agent`]: the bounded plan/act/observe loop (at most 5 tool calls)
//! - [`llm`]: the chat-completions engine behind a trait
//!
//! ## Example
//!
//! ```rust,ignore
//! use agentic_search::{agent::{Agent, TaskPayload}, github::RepositoryRef, Config};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::new(&config)?;
//! let repo = RepositoryRef::parse("octocat/Hello-World")?;
//! let answer = agent.run(&TaskPayload::new(&repo, "What license does this use?")).await?;
//! println!("{}", answer.text);
//! ```

pub mod agent;
pub mod config;
pub mod github;
pub mod llm;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
