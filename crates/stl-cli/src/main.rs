use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use crate::commands::CommandContext;
use anyhow::Result;
use stl_client::config::ClientConfig;
use tracing::Level;

/// Terminal client for the ST&L logistics portal
#[derive(Parser, Debug)]
#[command(name = "stl", about = "ST&L Logistics portal client")]
pub struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory location (overrides $STL_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log session and access decisions
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for configuration inspection
#[derive(Subcommand, Debug)]
#[command(about = "Inspect CLI configuration")]
pub enum ConfigCommands {
    /// Show current effective configuration
    Show,
}

/// Top-level commands for stl
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and persist the session
    Login {
        username: String,

        /// Password; read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and forget stored credentials
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Create a client account
    Register {
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Company name for the client profile
        #[arg(long)]
        company: Option<String>,
    },

    /// Resolve a portal path and show what the session would see
    Open {
        /// Path such as /shipments/42
        path: String,

        /// Exit with an error when access is denied
        #[arg(long)]
        strict: bool,
    },

    /// Print the navigation menu for the signed-in user
    Menu {
        /// Highlight entries matching this path
        #[arg(long)]
        current: Option<String>,
    },

    /// List the route table
    Routes,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    // Load configuration
    let config = ClientConfig::resolve(cli.config, cli.data_dir)?;

    // Create command context
    let ctx = CommandContext::new(config)?;

    // Dispatch commands
    match cli.command {
        Commands::Login { username, password } => {
            commands::session::login(&ctx, &username, password).await?;
        }
        Commands::Logout => {
            commands::session::logout(&ctx);
        }
        Commands::Whoami => {
            commands::session::whoami(&ctx).await?;
        }
        Commands::Register { username, email, password, company } => {
            commands::session::register(&ctx, username, email, password, company).await?;
        }
        Commands::Open { path, strict } => {
            commands::navigation::open(&ctx, &path, strict).await?;
        }
        Commands::Menu { current } => {
            commands::navigation::show_menu(&ctx, current.as_deref()).await?;
        }
        Commands::Routes => {
            commands::navigation::list_routes(&ctx);
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(&ctx, command)?;
        }
    }

    Ok(())
}
