//! Location and layering of the CLI config file.

use std::path::{Path, PathBuf};

use freshplate_core::auth::Credential;
use freshplate_core::config::{ClientConfig, TOKEN_ENV};
use freshplate_core::util::normalize_text_option;

use crate::error::CliError;

const CONFIG_DIR_NAME: &str = "freshplate";
const CONFIG_FILE_NAME: &str = "cli-config.json";

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    explicit.map_or_else(default_config_path, Ok)
}

/// Flag value first, then the environment, then the config file.
pub fn resolve_client_config(
    api_url_flag: Option<String>,
    env: ClientConfig,
    path: &Path,
) -> Result<ClientConfig, CliError> {
    let flags = ClientConfig {
        api_base_url: normalize_text_option(api_url_flag),
        ..ClientConfig::default()
    };
    let file = ClientConfig::load_from_path(path)?;
    Ok(flags.or(env).or(file))
}

pub fn resolve_token(
    token_flag: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<Credential> {
    Credential::parse(normalize_text_option(token_flag).or_else(|| lookup(TOKEN_ENV)))
}
