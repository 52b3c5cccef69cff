//! Blocking FIFO of pending requests
//!
//! One producer pushes requests; every worker pops them. The shutdown
//! sentinel travels through the queue like any other request, so everything
//! pushed before it is handed out first.
//!
//! # Drain Semantics
//!
//! Once a worker pops the sentinel, the queue is drained: all waiting workers
//! are woken and every later `pop_blocking` returns a copy of the sentinel
//! immediately. Pushing after the sentinel is rejected.

use crate::types::{BankError, Request};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

#[derive(Debug, Default)]
struct QueueState {
    /// Requests waiting for a worker, oldest first
    pending: VecDeque<Request>,

    /// Set once the sentinel has been pushed
    sealed: bool,

    /// The sentinel, once a worker has popped it
    drained: Option<Request>,
}

/// Unbounded thread-safe request FIFO
#[derive(Debug, Default)]
pub struct RequestQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl RequestQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request to the tail
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the shutdown sentinel was already pushed.
    pub fn push(&self, request: Request) -> Result<(), BankError> {
        {
            let mut state = self.state.lock();
            if state.sealed {
                return Err(BankError::QueueClosed);
            }
            state.sealed = request.is_shutdown();
            state.pending.push_back(request);
        }

        self.available.notify_one();
        Ok(())
    }

    /// Remove and return the head, blocking while the queue is empty
    ///
    /// After the sentinel has been popped, returns the sentinel forever.
    pub fn pop_blocking(&self) -> Request {
        let mut state = self.state.lock();
        loop {
            if let Some(sentinel) = &state.drained {
                return sentinel.clone();
            }

            if let Some(request) = state.pending.pop_front() {
                if request.is_shutdown() {
                    state.drained = Some(request.clone());
                    drop(state);
                    self.available.notify_all();
                }
                return request;
            }

            self.available.wait(&mut state);
        }
    }

    /// Number of requests waiting for a worker
    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Whether no requests are waiting
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the sentinel has been pushed
    pub fn is_sealed(&self) -> bool {
        self.state.lock().sealed
    }

    /// Whether a worker has popped the sentinel
    pub fn is_drained(&self) -> bool {
        self.state.lock().drained.is_some()
    }
}
