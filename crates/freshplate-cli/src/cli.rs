use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "freshplate")]
#[command(about = "Sign in and edit FreshPlate recipes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Session token (defaults to FRESHPLATE_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// API base URL override
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Optional path to the CLI config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password and print the session token
    Login {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show a recipe as the edit screen would load it
    Show {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a recipe and submit the update
    Edit(EditArgs),
    /// Inspect or update the CLI config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct EditArgs {
    /// Recipe ID
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New ingredients
    #[arg(long)]
    pub ingredients: Option<String>,
    /// New instructions
    #[arg(long)]
    pub instructions: Option<String>,
    /// New preparation time in minutes
    #[arg(long)]
    pub preptime: Option<String>,
    /// New cooking time in minutes
    #[arg(long)]
    pub cooktime: Option<String>,
    /// New number of servings
    #[arg(long)]
    pub servings: Option<String>,
    /// Image file to upload in place of the current one
    #[arg(long, value_name = "PATH", conflicts_with = "delete_image")]
    pub image: Option<PathBuf>,
    /// Remove the current image
    #[arg(long)]
    pub delete_image: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Store the API base URL in the config file
    SetApiUrl {
        /// API base URL, e.g. <https://api.freshplate.example>
        url: String,
    },
}
