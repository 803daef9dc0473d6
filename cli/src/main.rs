// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Reviewer CLI
//!
//! The `reviewer` binary drives the reviewer assignment core directly
//! against the configured storage backend.
//!
//! ## Commands
//!
//! - `reviewer team upsert|get|deactivate` - Team reconciliation
//! - `reviewer pr create|merge|reassign|get` - Pull request flows
//! - `reviewer member set-active|reviews|get` - Member operations
//! - `reviewer stats` - Assignment counts per reviewer
//! - `reviewer migrate` - Apply database migrations
//! - `reviewer config show|validate|generate` - Configuration management
//!
//! Results are printed as JSON on stdout. Failures print `CODE: message` on
//! stderr and exit with a status derived from the error kind.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use reviewer_cli::commands::{
    self, ConfigCommand, MemberCommand, MigrateCommand, PrCommand, StatsCommand, TeamCommand,
};
use reviewer_cli::context::AppContext;
use reviewer_core::domain::config::{LoggingConfig, ReviewerConfigManifest};

/// Reviewer - pull request reviewer assignment
#[derive(Parser)]
#[command(name = "reviewer")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "REVIEWER_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Seed for reviewer selection, for reproducible runs
    #[arg(long, global = true, env = "REVIEWER_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Team reconciliation and activity
    #[command(name = "team")]
    Team {
        #[command(subcommand)]
        command: TeamCommand,
    },

    /// Pull request operations
    #[command(name = "pr")]
    Pr {
        #[command(subcommand)]
        command: PrCommand,
    },

    /// Member operations
    #[command(name = "member")]
    Member {
        #[command(subcommand)]
        command: MemberCommand,
    },

    /// Assignment counts per reviewer
    #[command(name = "stats")]
    Stats {
        #[command(flatten)]
        command: StatsCommand,
    },

    /// Apply database migrations
    #[command(name = "migrate")]
    Migrate {
        #[command(flatten)]
        command: MigrateCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // .env is optional
    let _ = dotenvy::dotenv();

    if let Err(err) = run(cli).await {
        let classified = commands::classify(&err);
        match &classified {
            Some((_, code, message)) => eprintln!("{}: {}", code.red().bold(), message),
            None => eprintln!("{}: {:#}", "INTERNAL_SERVER_ERROR".red().bold(), err),
        }
        std::process::exit(commands::exit_status(classified.map(|c| c.0)));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ReviewerConfigManifest::load_or_default(cli.config.clone());

    let mut logging = config.as_ref().map(|c| c.logging()).unwrap_or_default();
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    init_logging(&logging)?;

    if let Commands::Config { command } = cli.command {
        return commands::config::handle_command(command, cli.config).await;
    }

    let config = config.context("Failed to load configuration")?;

    if let Commands::Migrate { command } = cli.command {
        return commands::migrate::execute(command, &config).await;
    }

    let ctx = AppContext::build(&config, cli.seed).await?;

    match cli.command {
        Commands::Team { command } => commands::team::handle_command(command, &ctx).await,
        Commands::Pr { command } => commands::pr::handle_command(command, &ctx).await,
        Commands::Member { command } => commands::member::handle_command(command, &ctx).await,
        Commands::Stats { command } => commands::stats::execute(command, &ctx).await,
        Commands::Config { .. } | Commands::Migrate { .. } => Ok(()),
    }
}

/// Initialize tracing subscriber for logging. Logs go to stderr so stdout
/// stays machine-readable.
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&logging.level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
