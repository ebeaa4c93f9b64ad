//! cw-probe
//!
//! Headless probe for console-windows. Opens a console session against a
//! gateway without any renderer and reports the connection lifecycle,
//! which is handy when checking gateway credentials and tunnel settings.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cw_cli::commands::{self, ConnectArgs};
use cw_cli::output::print_error;

#[derive(Parser)]
#[command(name = "cw-probe")]
#[command(author, version, about = "Headless probe for remote console windows")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a console connection and follow it until it closes
    Connect(ConnectArgs),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Get a specific config value, e.g. retry.max_retries
    Get { key: String },
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.as_ref();
    let result = match cli.command {
        Commands::Connect(args) => match commands::load_console_config(config_path) {
            Ok(config) => commands::connect_command(config, args).await,
            Err(e) => Err(e),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(config_path),
            ConfigAction::Get { key } => commands::config_get(config_path, &key),
            ConfigAction::Init { force } => commands::config_init(config_path, force),
            ConfigAction::Path => {
                println!("{}", commands::resolve_config_path(config_path).display());
                Ok(())
            }
        },
    };

    if let Err(e) = &result {
        print_error(&format!("{:#}", e));
    }
    result
}
