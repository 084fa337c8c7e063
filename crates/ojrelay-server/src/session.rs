//! In-memory session store for upstream cookie propagation.
//!
//! Maps a client-supplied session key to the last cookie string captured
//! from an upstream response. Last write wins; entries are never evicted and
//! do not survive a restart. Both the proxy and captcha handlers share one
//! store so their cookie state cannot diverge.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

/// Thread-safe map of session key -> upstream cookie string.
#[derive(Clone, Default)]
pub struct SessionStore {
    cookies: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cookie string captured for a session key, if any.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.cookies.read().await.get(key).cloned()
    }

    /// Store the cookie string for a session key, replacing any prior value.
    pub async fn store(&self, key: &str, cookie: String) {
        debug!(session = %key, "Storing upstream cookie");
        self.cookies.write().await.insert(key.to_string(), cookie);
    }

    /// Number of sessions with a captured cookie.
    pub async fn len(&self) -> usize {
        self.cookies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cookies.read().await.is_empty()
    }
}
