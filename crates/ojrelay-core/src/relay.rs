//! Relay request model and the browser header identity.
//!
//! The upstream web API rejects requests that do not look like a desktop
//! browser, so every forwarded request starts from a fixed Chrome identity.
//! Caller-supplied headers overlay the defaults key by key; POST extras are
//! applied last so the JSON content type and CSRF token always win.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Upstream path of the captcha image endpoint.
pub const CAPTCHA_PATH: &str = "/lg4/captcha";

/// Desktop Chrome identity presented to the upstream host.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// `Accept` value sent for captcha image requests.
const ACCEPT_IMAGE: &str = "image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

/// Session key used when the caller supplies neither a session ID nor an
/// `X-Forwarded-For` header.
pub const DEFAULT_SESSION_KEY: &str = "default";

/// A client-described request to forward to the upstream host.
///
/// Field names mirror the JSON the browser frontend sends (camelCase).
/// Everything except `path` is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayRequest {
    /// Upstream path, e.g. `/api/problem/list`.
    pub path: String,

    /// HTTP method; `GET` when absent.
    pub method: Option<String>,

    /// Optional JSON body forwarded verbatim.
    pub body: Option<serde_json::Value>,

    /// Caller headers overlaid on the spoofed defaults.
    pub headers: Option<HashMap<String, String>>,

    /// CSRF token sent as `x-csrf-token` on POST.
    pub csrf_token: Option<String>,

    /// Session key correlating cookie state across requests.
    pub session_id: Option<String>,

    /// Cookie fallback used when the store has nothing for the session key.
    pub client_cookies: Option<String>,
}

impl RelayRequest {
    /// Validate the request. The only hard requirement is a non-empty path.
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(Error::MissingPath);
        }
        Ok(())
    }

    /// Effective HTTP method, uppercased; `GET` when absent.
    pub fn method(&self) -> String {
        self.method
            .as_deref()
            .filter(|m| !m.is_empty())
            .map_or_else(|| "GET".to_string(), str::to_ascii_uppercase)
    }

    /// Resolve the session key: explicit `sessionId`, else the caller's
    /// `X-Forwarded-For` value, else [`DEFAULT_SESSION_KEY`].
    pub fn session_key(&self, forwarded_for: Option<&str>) -> String {
        self.session_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(forwarded_for)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION_KEY)
            .to_string()
    }
}

/// Build the outbound header set for a forwarded request.
///
/// `base_url` is the upstream origin (no trailing slash); `Referer` points at
/// its login page since that is where the frontend drives the session from.
/// Keys are lowercased so the caller overlay is case-insensitive.
pub fn browser_headers(
    base_url: &str,
    path: &str,
    method: &str,
    csrf_token: Option<&str>,
    client_headers: Option<&HashMap<String, String>>,
) -> HashMap<String, String> {
    let login_referer = format!("{base_url}/auth/login");
    let mut headers: HashMap<String, String> = [
        ("user-agent", BROWSER_USER_AGENT),
        ("accept", "*/*"),
        ("accept-language", "zh-CN,zh;q=0.9,en;q=0.8"),
        // Ask for an uncompressed body; the relay only passes bytes through.
        ("accept-encoding", "identity"),
        ("connection", "keep-alive"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect();
    headers.insert("referer".to_string(), login_referer.clone());
    headers.insert("origin".to_string(), base_url.to_string());

    if path == CAPTCHA_PATH {
        headers.insert("accept".to_string(), ACCEPT_IMAGE.to_string());
    }

    if let Some(extra) = client_headers {
        for (name, value) in extra {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }
    }

    if method == "POST" {
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert("referer".to_string(), login_referer);
        if let Some(token) = csrf_token {
            headers.insert("x-csrf-token".to_string(), token.to_string());
        }
    }

    headers
}
