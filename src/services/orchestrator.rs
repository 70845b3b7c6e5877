//! The run loop: compose directory, accounts, signals, building, and
//! dispatch, isolating every per-account failure from the rest of the run.
//!
//! Per run: `Starting -> RouterReady -> Streaming -> {Dispatched | Skipped |
//! Failed}* -> Done | AbortedFatal`. Only setup failures (readiness, store)
//! abort; per-account errors are logged and contained.

use futures::stream::{StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::{AccountFeed, SignalSource};
use crate::config::{DispatchMode, RouterConfig};
use crate::domain::Account;
use crate::error::{Result, TransactorError};
use crate::services::builder::{build_transaction, BuildOutcome};
use crate::services::dispatch::Dispatch;
use crate::services::readiness::ReadinessGate;
use crate::services::router_process::RouterProcess;

/// Outcome counts for one finished run. Per-account failures are contained
/// here; they never surface to the caller as errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum AccountOutcome {
    Dispatched,
    Skipped,
    Failed,
}

pub struct Orchestrator {
    feed: Arc<dyn AccountFeed>,
    signals: Arc<dyn SignalSource>,
    dispatcher: Arc<dyn Dispatch>,
    gate: ReadinessGate,
    router: RouterConfig,
    dispatch_mode: DispatchMode,
    max_concurrent: usize,
    // Single-run-at-a-time discipline: a trigger that lands while a run still
    // holds an open account stream is refused, not queued.
    run_lock: Mutex<()>,
}

impl Orchestrator {
    pub fn new(
        feed: Arc<dyn AccountFeed>,
        signals: Arc<dyn SignalSource>,
        dispatcher: Arc<dyn Dispatch>,
        gate: ReadinessGate,
        router: RouterConfig,
        dispatch_mode: DispatchMode,
        max_concurrent: usize,
    ) -> Self {
        Self {
            feed,
            signals,
            dispatcher,
            gate,
            router,
            dispatch_mode,
            max_concurrent: max_concurrent.max(1),
            run_lock: Mutex::new(()),
        }
    }

    /// Execute one full run.
    ///
    /// The router subprocess, when configured, lives exactly as long as the
    /// run and is torn down whatever the outcome.
    pub async fn run(&self) -> Result<RunSummary> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| TransactorError::RunInProgress)?;

        info!("Starting transaction run");

        let router_process = match &self.router.command {
            Some(command) => Some(RouterProcess::spawn(command)?),
            None => None,
        };

        let result = self.run_gated().await;

        if let Some(process) = router_process {
            process.shutdown().await;
        }

        match &result {
            Ok(summary) => info!(
                dispatched = summary.dispatched,
                skipped = summary.skipped,
                failed = summary.failed,
                "Transaction run finished"
            ),
            Err(e) => warn!("Transaction run aborted: {e}"),
        }

        result
    }

    async fn run_gated(&self) -> Result<RunSummary> {
        if self.dispatch_mode == DispatchMode::Router {
            let ping_url = format!("{}/ping", self.router.base_url.trim_end_matches('/'));
            let timeouts = self.router.readiness_timeouts();

            if !self.gate.wait_ready(&ping_url, timeouts).await {
                return Err(TransactorError::RouterUnavailable {
                    url: ping_url,
                    waited_ms: timeouts.overall.as_millis(),
                });
            }
        }

        let directory = self.feed.algorithm_directory().await?;
        self.stream_accounts(&directory).await
    }

    async fn stream_accounts(&self, directory: &HashMap<Uuid, String>) -> Result<RunSummary> {
        let dispatched = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        self.feed
            .running_accounts()
            .filter_map(|item| {
                let failed = &failed;
                async move {
                    match item {
                        Ok(account) => Some(Ok(account)),
                        // One malformed record never aborts the stream.
                        Err(TransactorError::Decode(reason)) => {
                            warn!("Skipping undecodable account record: {reason}");
                            failed.fetch_add(1, Ordering::Relaxed);
                            None
                        }
                        Err(e) => Some(Err(e)),
                    }
                }
            })
            .try_for_each_concurrent(self.max_concurrent, |account| {
                let (dispatched, skipped, failed) = (&dispatched, &skipped, &failed);
                async move {
                    match self.process_account(&account, directory).await {
                        AccountOutcome::Dispatched => dispatched.fetch_add(1, Ordering::Relaxed),
                        AccountOutcome::Skipped => skipped.fetch_add(1, Ordering::Relaxed),
                        AccountOutcome::Failed => failed.fetch_add(1, Ordering::Relaxed),
                    };
                    Ok(())
                }
            })
            .await?;

        Ok(RunSummary {
            dispatched: dispatched.into_inner(),
            skipped: skipped.into_inner(),
            failed: failed.into_inner(),
        })
    }

    /// One account's pipeline: fetch signals, build, dispatch. Every stage
    /// failure is contained to this account.
    async fn process_account(
        &self,
        account: &Account,
        directory: &HashMap<Uuid, String>,
    ) -> AccountOutcome {
        let signals = match self.signals.fetch(&account.pair, account.interval).await {
            Ok(signals) => signals,
            Err(e) => {
                warn!(account = %account.id, "Error fetching signals: {e}");
                return AccountOutcome::Failed;
            }
        };

        let transaction = match build_transaction(account, directory, &signals) {
            Ok(BuildOutcome::Built(transaction)) => transaction,
            Ok(BuildOutcome::NoActionSkip) => {
                debug!(account = %account.id, "Signal is no_action; skipping");
                return AccountOutcome::Skipped;
            }
            Err(e) => {
                warn!(account = %account.id, "Error building transaction: {e}");
                return AccountOutcome::Failed;
            }
        };

        match self.dispatcher.dispatch(account, &transaction).await {
            Ok(result) => {
                info!(
                    account = %account.id,
                    transaction = %result.id,
                    pair = %account.pair,
                    action = %transaction.action,
                    "Transaction dispatched"
                );
                AccountOutcome::Dispatched
            }
            Err(e) => {
                // At-most-once, best effort: no retry, no durable record.
                warn!(account = %account.id, "Error dispatching transaction: {e}");
                AccountOutcome::Failed
            }
        }
    }
}
