//! Fixed pool of worker threads
//!
//! Every worker runs the same loop: pop a request, execute it, emit its result
//! line. A worker exits when it pops the shutdown sentinel; since the queue
//! keeps returning the sentinel once it has been popped, every sibling exits
//! on its next pop after the queue has drained.
//!
//! # Architecture
//!
//! ```text
//! WorkerPool
//!     ├── Arc<RequestQueue>       (shared FIFO, blocking pop)
//!     ├── Arc<TransactionEngine>  (locks + account store)
//!     ├── Arc<dyn ResultSink>     (serialized line output)
//!     └── Arc<WorkerStats>        (outcome counters)
//! ```

use crate::core::engine::TransactionEngine;
use crate::core::request_queue::RequestQueue;
use crate::core::traits::ResultSink;
use crate::types::{BankError, Request, ResultLine};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Counters updated by workers as requests complete
#[derive(Debug, Default)]
pub struct WorkerStats {
    balance_checks: AtomicU64,
    committed: AtomicU64,
    insufficient_funds: AtomicU64,
    dropped: AtomicU64,
}

impl WorkerStats {
    fn record(&self, line: &ResultLine) {
        let counter = match line {
            ResultLine::Balance { .. } => &self.balance_checks,
            ResultLine::Committed { .. } => &self.committed,
            ResultLine::InsufficientFunds { .. } => &self.insufficient_funds,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Balance lines emitted
    pub fn balance_checks(&self) -> u64 {
        self.balance_checks.load(Ordering::Relaxed)
    }

    /// Transfers committed
    pub fn committed(&self) -> u64 {
        self.committed.load(Ordering::Relaxed)
    }

    /// Transfers aborted for insufficient funds
    pub fn insufficient_funds(&self) -> u64 {
        self.insufficient_funds.load(Ordering::Relaxed)
    }

    /// Requests dropped because of a request-scoped error
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Running worker threads
pub struct WorkerPool {
    handles: Vec<JoinHandle<Result<(), BankError>>>,
    stats: Arc<WorkerStats>,
}

impl WorkerPool {
    /// Start `workers` threads draining `queue`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a thread cannot be spawned, since the
    /// requested pool does not fit the host. In that case the queue is closed
    /// and the threads already started are joined first.
    pub fn spawn(
        workers: usize,
        engine: Arc<TransactionEngine>,
        queue: Arc<RequestQueue>,
        sink: Arc<dyn ResultSink>,
    ) -> Result<Self, BankError> {
        let stats = Arc::new(WorkerStats::default());
        let mut handles = Vec::with_capacity(workers);

        for index in 0..workers {
            let worker = Worker {
                index,
                engine: Arc::clone(&engine),
                queue: Arc::clone(&queue),
                sink: Arc::clone(&sink),
                stats: Arc::clone(&stats),
            };
            let spawned = thread::Builder::new()
                .name(format!("worker-{}", index))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Release the threads already waiting on the queue
                    let _ = queue.push(Request::shutdown(0));
                    let _ = Self { handles, stats }.join();
                    return Err(BankError::invalid_config(format!(
                        "cannot start worker {} of {}: {}",
                        index, workers, e
                    )));
                }
            }
        }

        tracing::info!(workers, "worker pool started");
        Ok(Self { handles, stats })
    }

    /// Wait for every worker to exit
    ///
    /// Only returns once all threads have been joined. Reports the first
    /// worker failure, if any.
    pub fn join(self) -> Result<Arc<WorkerStats>, BankError> {
        let mut first_error = None;

        for (index, handle) in self.handles.into_iter().enumerate() {
            let outcome = handle
                .join()
                .unwrap_or(Err(BankError::WorkerPanicked { worker: index }));
            if let Err(e) = outcome {
                tracing::error!(worker = index, error = %e, "worker failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(self.stats),
        }
    }
}

/// State owned by one worker thread
struct Worker {
    index: usize,
    engine: Arc<TransactionEngine>,
    queue: Arc<RequestQueue>,
    sink: Arc<dyn ResultSink>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    fn run(self) -> Result<(), BankError> {
        loop {
            let request = self.queue.pop_blocking();

            match self.engine.execute(&request) {
                Ok(Some(line)) => {
                    if let Err(e) = self.sink.emit(&line) {
                        tracing::error!(
                            worker = self.index,
                            request = line.request(),
                            error = %e,
                            "failed to write result line"
                        );
                        return Err(e);
                    }
                    self.stats.record(&line);
                }
                // Only the shutdown sentinel produces no line
                Ok(None) => {
                    tracing::debug!(worker = self.index, "queue drained, worker exiting");
                    return Ok(());
                }
                Err(e) if e.is_request_scoped() => {
                    self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        worker = self.index,
                        request = request.id,
                        error = %e,
                        "request dropped"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
