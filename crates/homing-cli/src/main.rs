//! homing: resolve placement plans from the command line.
//!
//! # Usage
//!
//! ```text
//! homing solve --plan plan.json --config homing.toml
//! homing validate --plan plan.json
//! homing init-config --path homing.toml
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use homing_core::StrategyKind;

mod commands;

#[derive(Parser)]
#[command(
    name = "homing",
    about = "Homing: constraint-based placement of service demands",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a plan and print the decision.
    Solve {
        /// Translated plan (JSON).
        #[arg(short, long)]
        plan: PathBuf,
        /// Solver config (TOML). Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the configured strategy (greedy, random_pick).
        #[arg(long)]
        strategy: Option<StrategyKind>,
        /// Seed for random_pick.
        #[arg(long)]
        seed: Option<u64>,
        /// Override the configured deadline, in seconds.
        #[arg(long)]
        deadline_secs: Option<u64>,
    },
    /// Check a plan without solving it.
    Validate {
        #[arg(short, long)]
        plan: PathBuf,
    },
    /// Write a homing.toml scaffold.
    InitConfig {
        #[arg(short, long, default_value = "homing.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,homing_solver=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            plan,
            config,
            strategy,
            seed,
            deadline_secs,
        } => {
            let overrides = commands::solve::Overrides {
                strategy,
                seed,
                deadline_secs,
            };
            commands::solve::solve(&plan, config.as_deref(), overrides).await
        }
        Commands::Validate { plan } => commands::validate::validate(&plan),
        Commands::InitConfig { path } => commands::init::init_config(&path),
    }
}
