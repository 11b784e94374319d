//! Guardian CLI - Command line interface for CodeGuardian
//!
//! Resolves service endpoints, aggregates insights and runs code reviews.

mod commands;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use guardian_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    CommitsArgs, Context, InsightsArgs, PullsArgs, ReposArgs, ResolveArgs, ReviewArgs,
    ReviewCommitArgs,
};

/// CodeGuardian: endpoint resolution, insight aggregation and AI code review
#[derive(Parser, Debug)]
#[command(name = "guardian")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/codeguardian/config.toml)
    #[arg(long, global = true, env = "GUARDIAN_CONFIG")]
    config: Option<PathBuf>,

    /// Per-call network timeout, e.g. "3s" (overrides config and env)
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Show current configuration
    Config,

    /// Find a working URL for a possibly-stale service address
    Resolve(ResolveArgs),

    /// Aggregate AI insights and developer metrics
    #[command(visible_alias = "i")]
    Insights(InsightsArgs),

    /// Review a snippet or files
    #[command(visible_alias = "r")]
    Review(ReviewArgs),

    /// Review a commit from GitHub or a local checkout
    ReviewCommit(ReviewCommitArgs),

    /// List recent commits of a repository
    Commits(CommitsArgs),

    /// List a user's repositories
    Repos(ReposArgs),

    /// List open pull requests of a repository
    Pulls(PullsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.config.as_deref(), cli.timeout)?;

    if cli.verbose {
        tracing::info!(
            timeout = ?config.http.timeout,
            model = %config.ai.model,
            ai_review_url = ?config.services.ai_review_url,
            metrics_url = ?config.services.metrics_url,
            "Configuration loaded"
        );
    }

    let Some(command) = cli.command else {
        println!("CodeGuardian - review orchestration for distributed services");
        println!();
        println!("Use --help for usage information");
        return Ok(());
    };

    match command {
        Commands::Version => {
            println!("guardian {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Config => {
            print_config(&config)?;
            return Ok(());
        }
        _ => {}
    }

    let ctx = Context::new(config, Secrets::load()?);

    match command {
        Commands::Resolve(args) => args.execute(&ctx).await?,
        Commands::Insights(args) => args.execute(&ctx).await?,
        Commands::Review(args) => args.execute(&ctx).await?,
        Commands::ReviewCommit(args) => args.execute(&ctx).await?,
        Commands::Commits(args) => args.execute(&ctx).await?,
        Commands::Repos(args) => args.execute(&ctx).await?,
        Commands::Pulls(args) => args.execute(&ctx).await?,
        Commands::Version | Commands::Config => {}
    }

    Ok(())
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    commands::print_json(config)?;
    if let Some(path) = Config::default_config_path() {
        let state = if path.exists() {
            "exists"
        } else {
            "not found - using defaults"
        };
        eprintln!("Config file: {} ({})", path.display(), state);
    }
    Ok(())
}
