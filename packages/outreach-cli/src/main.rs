//! Outreach CLI
//!
//! Reads a prospect spreadsheet, scrapes each prospect's website, drafts a
//! personalized cold email and follow-ups, and exports JSON for workflow
//! automation.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;
mod config;
mod context;
mod render;

use config::{Config, ConfigOverrides};
use context::AppContext;

#[derive(Parser)]
#[command(name = "outreach")]
#[command(about = "Draft personalized B2B outreach emails from a prospect list")]
#[command(version)]
struct Cli {
    /// Run in quiet mode (non-interactive)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape, draft and export emails for every prospect in a file
    Run(cmd::run::RunArgs),

    /// Validate a prospect file and preview its rows
    Check {
        /// CSV or spreadsheet with prospect rows
        file: PathBuf,
    },

    /// Write a sample prospect CSV
    Sample {
        /// Destination file
        #[arg(default_value = "sample.csv")]
        path: PathBuf,

        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so prompts and drafts on stdout stay readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,outreach=info,outreach_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = AppContext::new(cli.quiet);

    if !ctx.quiet {
        render::print_banner();
    }

    match cli.command {
        Commands::Run(args) => {
            let config = Config::from_env()?.apply(&cli.overrides);
            cmd::run::run(&ctx, &config, args).await
        }
        Commands::Check { file } => cmd::check::run(&ctx, &file),
        Commands::Sample { path, force } => cmd::sample::run(&ctx, &path, force),
    }
}
