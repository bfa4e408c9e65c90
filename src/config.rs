//! Configuration management for agentic-search.
//!
//! Configuration can be set via environment variables (a `.env` file is
//! loaded first by the binary):
//! - `GITHUB_TOKEN` - Required. Bearer token for the GitHub REST API.
//! - `OPENAI_API_KEY` - Required. API key for the chat-completions endpoint.
//! - `OPENAI_MODEL` - Optional. Model identifier. Defaults to `gpt-5-mini`.
//! - `OPENAI_BASE_URL` - Optional. Chat-completions base URL. Defaults to `https://api.openai.com/v1`.

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub bearer token
    pub github_token: String,

    /// Chat-completions API key
    pub llm_api_key: String,

    /// Model identifier handed to the reasoning engine
    pub model: String,

    /// Chat-completions base URL (no trailing slash)
    pub llm_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `GITHUB_TOKEN` or
    /// `OPENAI_API_KEY` is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let github_token =
            get("GITHUB_TOKEN").ok_or_else(|| ConfigError::MissingEnvVar("GITHUB_TOKEN".to_string()))?;

        let llm_api_key = get("OPENAI_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let model = get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let llm_base_url = get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string());
        url::Url::parse(&llm_base_url)
            .map_err(|e| ConfigError::InvalidValue("OPENAI_BASE_URL".to_string(), e.to_string()))?;

        Ok(Self {
            github_token,
            llm_api_key,
            model,
            llm_base_url: llm_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(github_token: String, llm_api_key: String) -> Self {
        Self {
            github_token,
            llm_api_key,
            model: DEFAULT_MODEL.to_string(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_github_token_is_reported_first() {
        let err = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "GITHUB_TOKEN"));
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "  "),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "ghp_x"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gpt-5-mini");
        assert_eq!(config.llm_base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn base_url_is_validated_and_trimmed() {
        let config = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "ghp_x"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
            ("OPENAI_MODEL", "gpt-4.1-mini"),
        ]))
        .unwrap();
        assert_eq!(config.llm_base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "gpt-4.1-mini");

        let err = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "ghp_x"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "OPENAI_BASE_URL"));
    }
}
