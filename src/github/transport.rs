//! HTTP transport for the GitHub REST API.
//!
//! A single `reqwest::Client` carries the credential and fixed headers for
//! the lifetime of the process. Requests are never retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::error::GitHubError;

pub const GITHUB_API: &str = "https://api.github.com";
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const CLIENT_ID: &str = "agentic-search";

/// Issues one authenticated GET and returns the decoded JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `path` is relative to the API base and starts with `/`.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, GitHubError>;
}

pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// Build a transport bound to the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::MissingToken` for an empty token.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        if token.trim().is_empty() {
            return Err(GitHubError::MissingToken);
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|e| GitHubError::Transport(format!("Invalid token header: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPE));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_ID));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| GitHubError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: GITHUB_API.to_string(),
            client,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GitHubError::Timeout(HTTP_TIMEOUT.as_secs())
                } else {
                    GitHubError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound {
                resource: path.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GitHubError::Malformed(e.to_string()))
    }
}

/// GitHub error bodies look like `{"message": "...", "documentation_url": "..."}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_rejected_before_any_request() {
        assert!(matches!(HttpTransport::new(""), Err(GitHubError::MissingToken)));
        assert!(matches!(HttpTransport::new("   "), Err(GitHubError::MissingToken)));
    }

    #[test]
    fn extracts_api_error_message() {
        let body = r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com"}"#;
        assert_eq!(error_message(body), "Bad credentials");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }
}
