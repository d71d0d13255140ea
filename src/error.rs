//! Error types for snapdiff

use thiserror::Error;

/// Result type alias for snapdiff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or updating a hash tree
#[derive(Error, Debug)]
pub enum Error {
    /// A value could not be canonically encoded. The tree may be partially
    /// updated and should be re-initialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Engine not initialized: call initialize() before update()")]
    NotInitialized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),
}
