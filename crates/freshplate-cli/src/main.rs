//! FreshPlate CLI - sign in and edit recipes from the terminal
//!
//! Drives the recipe edit-flow controller from freshplate-core and prints its
//! notifications as they change.

mod cli;
mod commands;
mod config_file;
mod error;


use clap::Parser;
use freshplate_core::config::ClientConfig;

use crate::cli::{Cli, Commands};
use crate::commands::common::AppContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::edit::run_edit;
use crate::commands::login::run_login;
use crate::commands::show::run_show;
use crate::config_file::{resolve_client_config, resolve_config_path, resolve_token};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "freshplate=info"
                    .parse()
                    .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?,
            ),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let config_path = resolve_config_path(cli.config_path)?;
    let context = AppContext {
        config: resolve_client_config(cli.api_url, ClientConfig::from_env(), &config_path)?,
        credential: resolve_token(cli.token, |key| std::env::var(key).ok()),
    };

    match cli.command {
        Commands::Login { email, password } => run_login(&email, &password, &context).await?,
        Commands::Show { id, json } => run_show(&id, json, &context).await?,
        Commands::Edit(args) => run_edit(&args, &context).await?,
        Commands::Config { command } => run_config(command, &context, &config_path)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
