//! HTTP client for the upstream OJ host.
//!
//! One `reqwest::Client` with a fixed outbound timeout. Redirects are not
//! followed: login flows answer with `Set-Cookie` on a redirect status and
//! the browser frontend expects to see that status verbatim.

use std::time::Duration;

use tracing::debug;

use ojrelay_core::relay::{self, RelayRequest};

/// Errors from forwarding a request upstream.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The relay request named a method reqwest cannot represent.
    #[error("Unsupported method: {0}")]
    Method(String),

    /// Building the HTTP client failed.
    #[error("Upstream client error: {0}")]
    Client(String),

    /// The outbound request or body read failed.
    #[error("Upstream request error: {0}")]
    Request(String),
}

/// What came back from the upstream host.
#[derive(Debug)]
pub struct UpstreamReply {
    /// HTTP status returned by the upstream.
    pub status: u16,

    /// `Content-Type` of the response; `text/html` when the upstream omits it.
    pub content_type: String,

    /// Raw `Set-Cookie` values from the response.
    pub set_cookies: Vec<String>,

    /// Response body bytes, relayed verbatim.
    pub body: Vec<u8>,

    /// True when the content type says the body is an image.
    pub binary: bool,
}

/// Client for the upstream host, carrying the spoofed browser identity.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Build a client with a fixed outbound timeout.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Client` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// The upstream origin this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward a relay request, attaching `cookie` when present, and return
    /// the upstream reply for verbatim relaying.
    pub async fn forward(
        &self,
        req: &RelayRequest,
        cookie: Option<&str>,
    ) -> Result<UpstreamReply, UpstreamError> {
        let method_name = req.method();
        let method = reqwest::Method::from_bytes(method_name.as_bytes())
            .map_err(|_| UpstreamError::Method(method_name.clone()))?;
        let url = format!("{}{}", self.base_url, req.path);

        let mut headers = relay::browser_headers(
            &self.base_url,
            &req.path,
            &method_name,
            req.csrf_token.as_deref(),
            req.headers.as_ref(),
        );
        if let Some(cookie) = cookie {
            headers.insert("cookie".to_string(), cookie.to_string());
        }

        debug!(method = %method_name, url = %url, has_cookie = cookie.is_some(), "Forwarding upstream");

        let mut builder = self.http.request(method, &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();
        let binary = content_type.starts_with("image/");
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?
            .to_vec();

        debug!(
            status,
            content_type = %content_type,
            binary,
            bytes = body.len(),
            set_cookies = set_cookies.len(),
            "Upstream response"
        );

        Ok(UpstreamReply {
            status,
            content_type,
            set_cookies,
            body,
            binary,
        })
    }
}
