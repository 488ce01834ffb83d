//! Error types for freshplate-core

use thiserror::Error;

/// Result type alias using freshplate-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or saving client configuration.
///
/// Request, auth and edit-flow failures have their own enums next to the code
/// that produces them ([`crate::api::ApiError`], [`crate::auth::AuthError`],
/// [`crate::edit::EditError`]).
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration is missing a required value
    #[error("Configuration error: {0}")]
    Config(String),
}
