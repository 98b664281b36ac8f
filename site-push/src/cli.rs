///
/// This module implements the CLI interface for site-push: command parsing, the async `run`
/// entrypoint and the user-visible progress output.
///
/// All core logic (URL generation, push history, the push run itself) lives in the
/// [`site-push-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: `site-push push --config site-push.yaml [--dry-run]`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`site-push-core`]: ../../site-push-core/
use crate::load_config::load_config;
use crate::push_client::IndexingClient;
use anyhow::Result;
use clap::{Parser, Subcommand};
use site_push_core::generate::CandidateBatch;
use site_push_core::synchronise::{
    prepare, push_prepared, RunOutcome, SynchroniseConfig, SynchroniseReport,
};
use site_push_core::SitePushError;
use std::path::{Path, PathBuf};

/// CLI for site-push: tell a search engine about new blog posts.
#[derive(Parser)]
#[clap(
    name = "site-push",
    version,
    about = "Submit new blog post URLs to a search-engine indexing service"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Push every post URL not yet recorded in the push history
    Push {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// List the URLs that would be pushed without contacting the service
        #[clap(long)]
        dry_run: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Push { config, dry_run } => {
            let config = load_config(config)?;
            let sync_config = config.synchronise_config(dry_run);
            tracing::info!(command = "push", dry_run, "Starting push run");

            let client = if dry_run {
                None
            } else {
                Some(IndexingClient::new(config.push_settings()?)?)
            };

            match push_run(&sync_config, client.as_ref()).await {
                Ok(report) => {
                    print_outcome(&report, &config.history.path);
                    tracing::info!(command = "push", outcome = ?report.outcome, "Push run complete");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "push", error = %e, "Push run failed");
                    eprintln!("[ERROR] Push failed: {e}");
                    Err(e.into())
                }
            }
        }
    }
}

/// Exit code for an error returned by [`run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SitePushError>()
        .map(SitePushError::exit_code)
        .unwrap_or(1)
}

/// Prepares the batch, reports it, then pushes. `None` means dry run.
async fn push_run(
    sync_config: &SynchroniseConfig,
    client: Option<&IndexingClient>,
) -> Result<SynchroniseReport, SitePushError> {
    let prepared = prepare(sync_config)?;
    print_candidates(&prepared.batch, client.is_none());
    match client {
        Some(client) => push_prepared(sync_config, prepared, client).await,
        None => push_prepared(sync_config, prepared, &DryRunPusher).await,
    }
}

fn print_candidates(batch: &CandidateBatch, dry_run: bool) {
    for url in &batch.urls {
        if dry_run {
            println!("Would push: {url}");
        } else {
            println!("Added URL: {url}");
        }
    }
    if batch.filtered > 0 {
        println!("Filtered {} already pushed URLs", batch.filtered);
    }

    if batch.is_empty() {
        println!("No new URLs to push.");
    } else if !dry_run {
        println!("Pushing {} new URLs...", batch.urls.len());
    }
}

fn print_outcome(report: &SynchroniseReport, history_path: &Path) {
    if let Some(response) = &report.response {
        println!("Status code: {}", response.status);
        println!("Response: {}", response.body);
    }

    match &report.outcome {
        RunOutcome::NothingToPush => {}
        RunOutcome::DryRun => {
            println!("Dry run: {} new URLs not pushed.", report.candidates.len())
        }
        RunOutcome::Pushed { confirmed } => println!(
            "Successfully pushed {} URLs and saved to {}",
            confirmed,
            history_path.display()
        ),
        RunOutcome::NoneAccepted => println!("No URLs were successfully pushed."),
        RunOutcome::ResponseUnreadable { reason } => {
            println!("Error processing response: {reason}")
        }
    }

    if let Some(remain) = report.remain {
        println!("Remaining quota: {remain}");
    }
}

/// Stands in for the network during `--dry-run`; the orchestrator never calls it.
struct DryRunPusher;

#[async_trait::async_trait]
impl site_push_core::contract::Pusher for DryRunPusher {
    async fn push(
        &self,
        _site_url: &str,
        _urls: &[String],
    ) -> Result<site_push_core::contract::PushResponse, SitePushError> {
        Err(SitePushError::Configuration(
            "dry run must not contact the indexing service".to_string(),
        ))
    }
}
