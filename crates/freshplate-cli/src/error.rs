use std::io;

use freshplate_core::api::ApiError;
use freshplate_core::auth::AuthError;
use freshplate_core::edit::EditError;
use freshplate_core::models::ImageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] freshplate_core::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Load(String),
    #[error("Recipe was not updated")]
    SubmitFailed,
}
