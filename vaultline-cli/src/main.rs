//! Vaultline CLI - your account vault in the terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;
mod renderer;

use commands::{check, login, watch, GlobalArgs, Reported};

/// Vaultline - sign in to your account vault and keep it in view
#[derive(Parser)]
#[command(name = "vl", version, about, long_about = None)]
struct Cli {
    /// Path to settings.json (defaults to ~/.vaultline/settings.json)
    #[arg(long, global = true, env = "VAULTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Use built-in demo accounts instead of the configured endpoint
    #[arg(long, global = true)]
    demo: bool,

    /// Show debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and show your account once
    Login {
        /// Username (prompted if omitted)
        #[arg(long, short)]
        user: Option<String>,
        /// Password (prompted if omitted)
        #[arg(long, short)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in and keep your account view up to date until Ctrl-C
    Watch {
        /// Username (prompted if omitted)
        #[arg(long, short)]
        user: Option<String>,
        /// Password (prompted if omitted)
        #[arg(long, short)]
        password: Option<String>,
        /// Override the configured poll interval
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Check that the record store is reachable
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    vaultline_core::services::logging::init(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<Reported>() => ExitCode::FAILURE,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let global = GlobalArgs {
        config: cli.config,
        demo: cli.demo,
    };

    match cli.command {
        Commands::Login { user, password, json } => login::run(&global, user, password, json).await,
        Commands::Watch { user, password, interval_ms } => {
            watch::run(&global, user, password, interval_ms).await
        }
        Commands::Check { json } => check::run(&global, json).await,
    }
}
