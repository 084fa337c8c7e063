//! GitHub Actions `workflow_dispatch` client.
//!
//! Maps a symbolic workflow name to a workflow file in a fixed repository
//! and issues one authenticated POST to the GitHub REST dispatch endpoint.
//! No retries; the upstream failure status is passed through to the caller.

use serde_json::json;
use tracing::{debug, warn};

use ojrelay_core::workflow;

/// Environment variable holding the GitHub API token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Errors from the workflow dispatch subsystem.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The symbolic workflow name is not in the registry.
    #[error("Invalid workflow name: {0}")]
    UnknownWorkflow(String),

    /// No GitHub token was available in the environment.
    #[error("GitHub token not configured")]
    MissingToken,

    /// The HTTP request to the GitHub API failed.
    #[error("GitHub request error: {0}")]
    Request(String),

    /// GitHub returned a non-success status code.
    #[error("GitHub API error (status {status}): {body}")]
    ApiError {
        /// HTTP status code returned by GitHub.
        status: u16,
        /// Response body from GitHub.
        body: String,
    },
}

/// Client for the GitHub `workflow_dispatch` REST endpoint.
///
/// Holds the HTTP client, the target repository, the git ref dispatched
/// workflows run on, and the bearer token read from `GITHUB_TOKEN` at
/// construction time.
#[derive(Debug, Clone)]
pub struct WorkflowDispatcher {
    /// The reqwest HTTP client.
    http: reqwest::Client,

    /// GitHub API base URL (overridable for tests).
    api_base: String,

    /// Target repository, `owner/repo`.
    repo: String,

    /// Git ref the dispatched workflows run on.
    git_ref: String,

    /// Bearer token for the GitHub API, read from `GITHUB_TOKEN` at
    /// construction time. Dispatch is rejected when `None`.
    token: Option<String>,
}

impl WorkflowDispatcher {
    /// Create a dispatcher; the token is read from `GITHUB_TOKEN`.
    ///
    /// Logs a warning when the variable is not set, since every dispatch
    /// will then be rejected with a server error.
    pub fn new(
        api_base: impl Into<String>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        let token = std::env::var(GITHUB_TOKEN_ENV).ok();
        if token.is_none() {
            warn!("Environment variable {GITHUB_TOKEN_ENV} is not set; workflow dispatch disabled");
        }
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            repo: repo.into(),
            git_ref: git_ref.into(),
            token,
        }
    }

    /// Replace the token read from the environment (tests).
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// The target repository, `owner/repo`.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Dispatch a workflow by symbolic name.
    ///
    /// # Errors
    ///
    /// `UnknownWorkflow` for names outside the registry, `MissingToken` when
    /// no token is configured, `Request` when the HTTP request fails, and
    /// `ApiError` when GitHub answers with a non-2xx status.
    pub async fn dispatch(&self, name: &str) -> Result<(), DispatchError> {
        let file = workflow::resolve_required(name)
            .map_err(|_| DispatchError::UnknownWorkflow(name.to_string()))?;
        let token = self.token.as_deref().ok_or(DispatchError::MissingToken)?;
        let url = workflow::dispatch_url(&self.api_base, &self.repo, file);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", "ojrelay")
            .json(&json!({ "ref": self.git_ref, "inputs": {} }))
            .send()
            .await
            .map_err(|e| DispatchError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(workflow = name, file, "Workflow dispatched");
            Ok(())
        } else {
            let status_code = status.as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            warn!(status = status_code, body = %body, "GitHub API returned error");
            Err(DispatchError::ApiError {
                status: status_code,
                body,
            })
        }
    }
}
