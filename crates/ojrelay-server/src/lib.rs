//! ojrelay Gateway Server Library
//!
//! Core functionality for the ojrelay gateway:
//! - Session store mapping session keys to captured upstream cookies
//! - Upstream client carrying the spoofed browser identity
//! - GitHub `workflow_dispatch` client
//! - axum routes with wildcard CORS

pub mod github;
pub mod routes;
pub mod session;
pub mod upstream;
