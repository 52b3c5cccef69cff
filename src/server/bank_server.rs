//! Bank server driver
//!
//! `BankServer::run` is the whole lifecycle of one batch of commands:
//! 1. Start the worker pool on a fresh request queue
//! 2. Read commands on the calling thread and push them to the queue
//! 3. Push the shutdown sentinel (the one read from input, or a synthetic
//!    one if input ended without `END`)
//! 4. Join every worker; by then every queued request has its result line
//!
//! Malformed lines are logged and counted, never queued.

use crate::core::{
    AccountStore, Accounts, LockManager, RequestQueue, ResultSink, TransactionEngine, WorkerPool,
};
use crate::io::CommandReader;
use crate::server::config::EngineConfig;
use crate::types::{BankError, Request};
use std::io::Read;
use std::sync::Arc;

/// Counters describing one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Balance checks and transfers queued
    pub accepted: u64,
    /// Input lines rejected by the command reader
    pub malformed: u64,
    /// Balance lines emitted
    pub balance_checks: u64,
    /// Transfers committed
    pub committed: u64,
    /// Transfers aborted for insufficient funds
    pub insufficient_funds: u64,
    /// Requests dropped with no result line (unknown account, overflow)
    pub dropped: u64,
}

/// Concurrent transaction server over a fixed set of accounts
pub struct BankServer {
    config: EngineConfig,
    accounts: Arc<dyn AccountStore>,
}

impl BankServer {
    /// Validate the configuration and initialize the accounts
    pub fn new(config: EngineConfig) -> Result<Self, BankError> {
        config.validate()?;
        tracing::info!(
            accounts = config.accounts,
            initial_balance = config.initial_balance,
            "initializing accounts"
        );
        let accounts = Arc::new(Accounts::new(config.accounts, config.initial_balance)?);
        Ok(Self { config, accounts })
    }

    /// Run over a caller-supplied account store
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration is invalid or the store's
    /// account count differs from `config.accounts`.
    pub fn with_store(
        config: EngineConfig,
        accounts: Arc<dyn AccountStore>,
    ) -> Result<Self, BankError> {
        config.validate()?;
        if accounts.account_count() != config.accounts {
            return Err(BankError::invalid_config(format!(
                "store holds {} accounts, configuration expects {}",
                accounts.account_count(),
                config.accounts
            )));
        }
        Ok(Self { config, accounts })
    }

    /// The account store, for inspection after a run
    pub fn accounts(&self) -> &Arc<dyn AccountStore> {
        &self.accounts
    }

    /// Process every command from `commands`, writing result lines to `sink`
    ///
    /// Returns once every worker has exited.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The lock table cannot be allocated or a worker thread cannot be
    ///   started (`InvalidConfig`)
    /// - Reading the input fails (queued requests are still drained first)
    /// - Writing a result line fails or a worker panics
    pub fn run<R: Read>(
        &self,
        mut commands: CommandReader<R>,
        sink: Arc<dyn ResultSink>,
    ) -> Result<RunSummary, BankError> {
        let locks = Arc::new(LockManager::try_new(self.accounts.account_count())?);
        let engine = Arc::new(TransactionEngine::with_locks(
            Arc::clone(&self.accounts),
            locks,
        )?);
        let queue = Arc::new(RequestQueue::new());

        tracing::info!(workers = self.config.workers, "creating worker threads");
        let pool = WorkerPool::spawn(self.config.workers, engine, Arc::clone(&queue), sink)?;

        let mut summary = RunSummary::default();
        let produced = Self::produce(&mut commands, &queue, &mut summary);

        if !queue.is_sealed() {
            if produced.is_ok() && !commands.saw_end() {
                tracing::warn!("input ended without END, shutting down after queued requests");
            }
            queue.push(Request::shutdown(commands.next_request_id()))?;
        }

        tracing::info!("waiting on workers to finish processing requests");
        let stats = pool.join()?;
        produced?;

        summary.balance_checks = stats.balance_checks();
        summary.committed = stats.committed();
        summary.insufficient_funds = stats.insufficient_funds();
        summary.dropped = stats.dropped();

        tracing::info!(
            accepted = summary.accepted,
            malformed = summary.malformed,
            balance_checks = summary.balance_checks,
            committed = summary.committed,
            insufficient_funds = summary.insufficient_funds,
            dropped = summary.dropped,
            "run complete"
        );
        Ok(summary)
    }

    /// Feed the queue until `END`, end of input, or a read failure
    fn produce<R: Read>(
        commands: &mut CommandReader<R>,
        queue: &RequestQueue,
        summary: &mut RunSummary,
    ) -> Result<(), BankError> {
        for item in commands {
            match item {
                Ok(request) => {
                    if !request.is_shutdown() {
                        summary.accepted += 1;
                    }
                    queue.push(request)?;
                }
                Err(e @ BankError::ParseError { .. }) => {
                    summary.malformed += 1;
                    tracing::warn!(error = %e, "skipping malformed command");
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to read commands");
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
