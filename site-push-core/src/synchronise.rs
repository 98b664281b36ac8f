//! High-level run: resolve → load history → generate → push → record.
//!
//! This module drives one push run for a blog site. The run is strictly linear:
//!   - Resolve the site URL from the site configuration (fatal on failure)
//!   - Load the push history (a missing file is an empty history)
//!   - Generate candidate URLs, dropping those already pushed; stop if none remain
//!   - Push the whole batch in one request through a [`Pusher`]
//!   - Parse the reply; on `success > 0` record the first `success` URLs and save the history
//!
//! # Responsibilities
//! - The history file is written at most once per run, and only after the service confirmed
//!   at least one URL. Transport failures and unreadable replies leave it untouched.
//! - Successes are matched to URLs by position: the service is assumed to accept a contiguous
//!   prefix of the submitted batch.
//!
//! [`synchronise`] runs everything. Callers that report progress before the request goes out
//! use [`prepare`] then [`push_prepared`]; the two together behave exactly like `synchronise`.
//!
//! # Error Handling
//! Configuration, transport and I/O failures are returned to the caller. An unreadable reply
//! is logged and reported as [`RunOutcome::ResponseUnreadable`].

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::contract::Pusher;
use crate::error::SitePushError;
use crate::generate::{generate_candidates, CandidateBatch, GenerateOptions};
use crate::history::PushHistory;
use crate::response::{parse_push_response, PushResponse};
use crate::site_url::{resolve_site_url, SiteUrl};

/// Everything one run needs besides the network client.
#[derive(Debug, Clone)]
pub struct SynchroniseConfig {
    /// File declaring `siteUrl`.
    pub site_config_path: PathBuf,
    pub generate: GenerateOptions,
    pub history_path: PathBuf,
    /// Generate and report candidates without pushing.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NothingToPush,
    DryRun,
    Pushed { confirmed: usize },
    NoneAccepted,
    ResponseUnreadable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynchroniseReport {
    pub site_url: String,
    pub discovered: usize,
    pub filtered: usize,
    /// URLs sent (or, in a dry run, that would have been sent).
    pub candidates: Vec<String>,
    /// URLs newly recorded in the history.
    pub confirmed: Vec<String>,
    pub remain: Option<u64>,
    /// Raw reply, when a push was made.
    pub response: Option<PushResponse>,
    pub outcome: RunOutcome,
}

/// Resolved site, loaded history and filtered candidates: everything before the push.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub site_url: SiteUrl,
    pub history: PushHistory,
    pub batch: CandidateBatch,
}

pub async fn synchronise<P>(
    config: &SynchroniseConfig,
    pusher: &P,
) -> Result<SynchroniseReport, SitePushError>
where
    P: Pusher + ?Sized,
{
    let prepared = prepare(config)?;
    push_prepared(config, prepared, pusher).await
}

/// Resolve the site URL, load the history and generate candidates. Touches no network and
/// writes nothing.
pub fn prepare(config: &SynchroniseConfig) -> Result<PreparedRun, SitePushError> {
    info!("[PUSH] Starting push run");

    let site_url = resolve_site_url(&config.site_config_path)?;
    let history = PushHistory::load(&config.history_path)?;
    let batch = generate_candidates(&config.generate, &site_url, &history)?;
    Ok(PreparedRun {
        site_url,
        history,
        batch,
    })
}

/// Push a prepared batch and record what the service accepted.
pub async fn push_prepared<P>(
    config: &SynchroniseConfig,
    prepared: PreparedRun,
    pusher: &P,
) -> Result<SynchroniseReport, SitePushError>
where
    P: Pusher + ?Sized,
{
    let PreparedRun {
        site_url,
        mut history,
        batch,
    } = prepared;

    let mut report = SynchroniseReport {
        site_url: site_url.to_string(),
        discovered: batch.discovered,
        filtered: batch.filtered,
        candidates: batch.urls.clone(),
        confirmed: Vec::new(),
        remain: None,
        response: None,
        outcome: RunOutcome::NothingToPush,
    };

    if batch.is_empty() {
        info!("[PUSH] No new URLs to push");
        return Ok(report);
    }

    if config.dry_run {
        info!(candidates = batch.urls.len(), "[PUSH] Dry run, not pushing");
        report.outcome = RunOutcome::DryRun;
        return Ok(report);
    }

    info!(count = batch.urls.len(), site_url = %site_url, "[PUSH] Pushing new URLs");
    let response = match pusher.push(site_url.as_str(), &batch.urls).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "[PUSH][ERROR] Push request failed, history left unchanged");
            return Err(e);
        }
    };
    info!(status = response.status, body = %response.body, "[PUSH] Indexing service replied");
    let parsed = parse_push_response(&response.body);
    report.response = Some(response);

    let summary = match parsed {
        Ok(summary) => summary,
        Err(e) => {
            warn!(error = %e, "[PUSH] Could not interpret reply, nothing recorded");
            report.outcome = RunOutcome::ResponseUnreadable {
                reason: e.to_string(),
            };
            return Ok(report);
        }
    };
    report.remain = summary.remain;

    if summary.success == 0 {
        info!("[PUSH] No URLs were accepted");
        report.outcome = RunOutcome::NoneAccepted;
        return Ok(report);
    }

    let accepted = usize::try_from(summary.success)
        .unwrap_or(usize::MAX)
        .min(batch.urls.len());
    if (accepted as u64) < summary.success {
        warn!(
            reported = summary.success,
            submitted = batch.urls.len(),
            "[PUSH] Service reported more successes than URLs submitted"
        );
    }

    let confirmed: Vec<String> = batch.urls[..accepted].to_vec();
    history.extend(confirmed.iter().cloned());
    history.save(&config.history_path)?;
    info!(
        confirmed = accepted,
        history_path = ?config.history_path,
        history_size = history.len(),
        "[PUSH] Recorded pushed URLs"
    );

    report.confirmed = confirmed;
    report.outcome = RunOutcome::Pushed {
        confirmed: accepted,
    };
    Ok(report)
}
