//! One fetch run: probe, enumerate, fetch details, save.

use super::account::{check_login, fetch_account_stats, LoginStatus};
use super::detail_source::{DetailSource, FetchProgress, SkippedFetch};
use super::enumerator::enumerate_work_ids;
use super::store::{SaveOutcome, SnapshotStore};
use super::types::AccountStats;
use crate::api::Transport;
use crate::credentials::AccountId;
use crate::run_log::RunLogger;
use anyhow::Result;

/// Milestones reported to the caller while a run progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Login(LoginStatus),
    Stats(Option<AccountStats>),
    Enumerated { count: usize },
    Progress(FetchProgress),
}

pub struct FetchContext<'a> {
    pub transport: &'a dyn Transport,
    pub account_id: &'a AccountId,
    pub detail_source: &'a dyn DetailSource,
    pub store: &'a SnapshotStore,
    pub check_login: bool,
    pub include_stats: bool,
    pub logger: Option<&'a RunLogger>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No work details were retrieved, so nothing was saved.
    NothingFetched,
    Saved(SaveOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub enumerated: usize,
    pub fetched: usize,
    pub skipped: Vec<SkippedFetch>,
    pub outcome: RunOutcome,
}

impl FetchContext<'_> {
    fn phase(&self, phase: &str, detail: &str) {
        tracing::info!(phase, detail, "fetch run");
        if let Some(logger) = self.logger {
            logger.log_phase(phase, detail);
        }
    }
}

/// Runs one fetch and appends a snapshot when anything was fetched.
///
/// # Errors
///
/// Returns `EnumerationFailed` or `Transport` when the work list cannot be
/// retrieved (nothing is saved), or an I/O error from the snapshot store.
pub fn run_fetch(ctx: &FetchContext<'_>, on_event: &mut dyn FnMut(RunEvent)) -> Result<RunReport> {
    if ctx.check_login {
        let status = check_login(ctx.transport);
        ctx.phase("login_check", &status.to_string());
        on_event(RunEvent::Login(status));
    }

    let stats = if ctx.include_stats {
        let stats = fetch_account_stats(ctx.transport, ctx.account_id);
        ctx.phase(
            "account_stats",
            if stats.is_some() { "fetched" } else { "unavailable" },
        );
        on_event(RunEvent::Stats(stats));
        stats
    } else {
        None
    };

    let ids = match enumerate_work_ids(ctx.transport, ctx.account_id) {
        Ok(ids) => ids,
        Err(err) => {
            ctx.phase("enumerate_failed", &err.to_string());
            return Err(err.into());
        }
    };
    ctx.phase("enumerated", &format!("{} works", ids.len()));
    on_event(RunEvent::Enumerated { count: ids.len() });

    let fetch = if ids.is_empty() {
        Default::default()
    } else {
        ctx.phase("fetch_details", ctx.detail_source.name());
        ctx.detail_source
            .fetch_details(ctx.transport, &ids, &mut |p| on_event(RunEvent::Progress(p)))
    };

    if let Some(logger) = ctx.logger {
        for skipped in &fetch.skipped {
            logger.log_skip(&skipped.ids, &skipped.reason);
        }
    }

    let outcome = if fetch.works.is_empty() {
        ctx.phase("save", "nothing fetched");
        RunOutcome::NothingFetched
    } else {
        let saved = ctx.store.append(&fetch.works, stats)?;
        if let (
            Some(logger),
            SaveOutcome::Saved {
                path,
                total_snapshots,
                ..
            },
        ) = (ctx.logger, &saved)
        {
            logger.log_saved(path, *total_snapshots, fetch.works.len());
        }
        RunOutcome::Saved(saved)
    };

    Ok(RunReport {
        enumerated: ids.len(),
        fetched: fetch.works.len(),
        skipped: fetch.skipped,
        outcome,
    })
}

#[cfg(test)]
#[path = "tests/runner_tests.rs"]
mod tests;
