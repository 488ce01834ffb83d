use std::path::Path;

use freshplate_core::config::ClientConfig;
use freshplate_core::util::normalize_base_url;

use crate::cli::ConfigCommands;
use crate::commands::common::AppContext;
use crate::error::CliError;

pub fn run_config(
    command: ConfigCommands,
    context: &AppContext,
    config_path: &Path,
) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            println!("Config file: {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&context.config)?);
            let token_state = if context.credential.is_some() {
                "set"
            } else {
                "not set"
            };
            println!("Token: {token_state}");
            Ok(())
        }
        ConfigCommands::SetApiUrl { url } => {
            let saved = set_api_url(config_path, &url)?;
            println!(
                "API URL set to {} in {}",
                saved.api_base_url.as_deref().unwrap_or_default(),
                config_path.display()
            );
            Ok(())
        }
    }
}

/// Validate `url` and persist it, keeping the rest of the file intact.
pub fn set_api_url(config_path: &Path, url: &str) -> Result<ClientConfig, CliError> {
    let normalized = normalize_base_url(url).map_err(CliError::Config)?;
    let mut config = ClientConfig::load_from_path(config_path)?;
    config.api_base_url = Some(normalized);
    config.save_to_path(config_path)?;
    Ok(config)
}
