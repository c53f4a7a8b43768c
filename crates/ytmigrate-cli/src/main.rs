//! `Ytmigrate` command line.
//!
//! Thin wrapper over `ytmigrate_core`: parses arguments, loads the
//! configuration, obtains credentials for both accounts, and drives a
//! migration run. All migration semantics live in the core crate.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use ytmigrate_core::{
    CollectionSelection, ConfigManager, CredentialProvider, Error, MigrationConfig,
    MigrationOrchestrator, OauthTokenProvider, ProgressLedger, Result, RunReport, YouTubeApi,
    read_subscriptions,
};

#[derive(Debug, Parser)]
#[command(name = "ytmigrate", version, about = "Migrate playlists and subscriptions between accounts")]
struct Cli {
    /// Path to an alternate config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Copy playlists from the source account to the destination account.
    Playlists {
        /// Migrate every playlist the source account owns.
        #[arg(long, conflicts_with = "playlist")]
        all: bool,

        /// Migrate only the named playlist id (repeatable).
        #[arg(long = "playlist", value_name = "ID")]
        playlist: Vec<String>,
    },
    /// Subscribe the destination account to channels from an exported CSV.
    Subscriptions {
        /// Path to the exported subscriptions CSV, overriding the config.
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
}

fn load_config(cli: &Cli) -> Result<MigrationConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    manager.load()
}

fn destination_api(
    provider: &OauthTokenProvider,
    config: &MigrationConfig,
) -> Result<YouTubeApi> {
    let credential = provider.obtain(&config.destination_token_cache, "destination account")?;
    Ok(YouTubeApi::new(credential))
}

fn run_playlists(config: &MigrationConfig, selection: &CollectionSelection) -> Result<RunReport> {
    let provider = OauthTokenProvider::new(&config.client_secrets_path)?;
    let source_credential = provider.obtain(&config.source_token_cache, "source account")?;
    let source = YouTubeApi::new(source_credential);
    let destination = destination_api(&provider, config)?;

    let mut ledger = ProgressLedger::open(&config.playlist_ledger_path)?;
    MigrationOrchestrator::new(&source, &destination).migrate_playlists(&mut ledger, selection)
}

fn run_subscriptions(config: &MigrationConfig, csv: Option<&PathBuf>) -> Result<RunReport> {
    let provider = OauthTokenProvider::new(&config.client_secrets_path)?;
    let destination = destination_api(&provider, config)?;
    // The source account is never contacted for subscriptions; the CSV
    // export is the input. The source handle just satisfies the
    // orchestrator's shape.
    let source = YouTubeApi::new(ytmigrate_core::Credential::new(String::new()));

    let csv_path = csv.unwrap_or(&config.subscriptions_csv_path);
    let entries = read_subscriptions(csv_path)?;

    let mut ledger = ProgressLedger::open(&config.subscription_ledger_path)?;
    MigrationOrchestrator::new(&source, &destination).migrate_subscriptions(&mut ledger, &entries)
}

fn run(cli: &Cli) -> Result<RunReport> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Playlists { all, playlist } => {
            let selection = if *all {
                CollectionSelection::All
            } else if playlist.is_empty() {
                return Err(Error::Configuration(
                    "pass --all or at least one --playlist <ID>".to_string(),
                ));
            } else {
                CollectionSelection::Ids(playlist.clone())
            };
            run_playlists(&config, &selection)
        }
        Command::Subscriptions { csv } => run_subscriptions(&config, csv.as_ref()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(report) => {
            println!("{}", report.summary());
            if report.halted {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(error = %e, "migration failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
