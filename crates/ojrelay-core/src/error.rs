//! Error types for the `ojrelay` core library.

use thiserror::Error;

/// Result type alias using `ojrelay` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `ojrelay` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The relay request did not name an upstream path.
    #[error("Path is required")]
    MissingPath,

    /// The symbolic workflow name is not in the registry.
    #[error("Invalid workflow name: {0}")]
    UnknownWorkflow(String),
}
