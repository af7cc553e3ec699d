//! MindLog CLI - Command-line interface for MindLog
//!
//! Provides commands for:
//! - Running a sync pass and viewing sync status
//! - Managing the local user, diary entries and consent records
//! - Reading counselor chat rooms
//! - Exporting and restoring backups
//! - Inspecting configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod output;

use commands::{
    autosync::AutosyncCommand, backup::BackupCommand, chat::ChatCommand, config::ConfigCommand,
    consent::ConsentCommand, diary::DiaryCommand, status::StatusCommand, sync::SyncCommand,
    user::UserCommand,
};
use context::CliContext;
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "mindlog", version, about = "Offline-first emotional diary client")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Push local diary entries to the backend now
    Sync(SyncCommand),
    /// Show synchronization status
    Status(StatusCommand),
    /// Turn automatic synchronization on or off
    #[command(subcommand)]
    Autosync(AutosyncCommand),
    /// Manage the local user
    #[command(subcommand)]
    User(UserCommand),
    /// Write, list and clean up diary entries
    #[command(subcommand)]
    Diary(DiaryCommand),
    /// Record and review data-use consent
    #[command(subcommand)]
    Consent(ConsentCommand),
    /// Read and write counselor chat messages
    #[command(subcommand)]
    Chat(ChatCommand),
    /// Export or restore a full backup
    #[command(subcommand)]
    Backup(BackupCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CliContext::new(cli.config, format);

    match cli.command {
        Commands::Sync(cmd) => cmd.execute(&ctx).await,
        Commands::Status(cmd) => cmd.execute(&ctx).await,
        Commands::Autosync(cmd) => cmd.execute(&ctx).await,
        Commands::User(cmd) => cmd.execute(&ctx).await,
        Commands::Diary(cmd) => cmd.execute(&ctx).await,
        Commands::Consent(cmd) => cmd.execute(&ctx).await,
        Commands::Chat(cmd) => cmd.execute(&ctx).await,
        Commands::Backup(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
    }
}
