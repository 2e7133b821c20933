//! Single-flight refresh coordination
//!
//! The gate holds the `refreshing` flag and the queue of requests waiting on
//! the refresh in flight. Admission checks and sets the flag inside one
//! critical section, so two requests can never both become the leader. The
//! leader's `Lease` settles the cycle: every waiter is released in arrival
//! order and the flag is reset under the same lock, so the queue is always
//! empty whenever the flag reads false.
//!
//! The lock is a `std::sync::Mutex` and is never held across an await.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use common::Secret;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

/// What a waiter receives when the refresh it queued behind settles.
#[derive(Debug)]
pub struct Release {
    pub access_token: Secret<String>,
    /// Zero-based release sequence within the cycle.
    pub position: u64,
}

type Outcome = std::result::Result<Release, session::Error>;

struct Pending {
    ticket: u64,
    tx: oneshot::Sender<Outcome>,
}

#[derive(Default)]
struct GateState {
    refreshing: bool,
    queue: VecDeque<Pending>,
    next_ticket: u64,
}

/// Process-wide refresh coordinator.
#[derive(Default)]
pub struct RefreshGate {
    state: Mutex<GateState>,
}

/// Result of entering the gate after a 401.
pub enum Admission<'a> {
    /// No refresh in flight: the caller performs it and must settle the lease.
    Lead(Lease<'a>),
    /// A refresh is in flight: the caller waits for it.
    Wait(Waiter),
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the gate: become the leader, or queue behind the current one.
    pub fn admit(&self) -> Admission<'_> {
        let mut state = self.lock();
        if state.refreshing {
            let ticket = state.next_ticket;
            state.next_ticket += 1;
            let (tx, rx) = oneshot::channel();
            state.queue.push_back(Pending { ticket, tx });
            debug!(ticket, queued = state.queue.len(), "queued behind refresh");
            Admission::Wait(Waiter { ticket, rx })
        } else {
            state.refreshing = true;
            debug!("refresh lease acquired");
            Admission::Lead(Lease {
                gate: self,
                settled: false,
            })
        }
    }

    /// Whether a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of requests waiting on the refresh in flight.
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Release every waiter in arrival order, then reset the flag.
    fn settle(&self, outcome: std::result::Result<&Secret<String>, &session::Error>) -> usize {
        let mut state = self.lock();
        let mut released = 0usize;
        for (position, pending) in state.queue.drain(..).enumerate() {
            let position = position as u64;
            let message = match outcome {
                Ok(token) => Ok(Release {
                    access_token: token.clone(),
                    position,
                }),
                Err(e) => Err(e.clone()),
            };
            debug!(ticket = pending.ticket, position, "releasing queued request");
            // A dropped receiver means that caller gave up; nothing to deliver.
            if pending.tx.send(message).is_ok() {
                released += 1;
            }
        }
        state.refreshing = false;
        state.next_ticket = 0;
        released
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("refresh gate mutex poisoned, recovering state");
                poisoned.into_inner()
            }
        }
    }
}

/// Exclusive right to perform the current refresh.
///
/// Must be settled. Dropping it unsettled (the leader's future was cancelled)
/// rejects every waiter with `Abandoned` and reopens the gate.
pub struct Lease<'a> {
    gate: &'a RefreshGate,
    settled: bool,
}

impl Lease<'_> {
    /// Refresh succeeded: hand the new access token to every waiter.
    pub fn succeed(mut self, access_token: &Secret<String>) -> usize {
        self.settled = true;
        self.gate.settle(Ok(access_token))
    }

    /// Refresh failed: reject every waiter with the same error.
    pub fn fail(mut self, error: &session::Error) -> usize {
        self.settled = true;
        self.gate.settle(Err(error))
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("refresh lease dropped before settling, rejecting waiters");
            self.gate.settle(Err(&session::Error::Abandoned));
        }
    }
}

/// A request parked behind the refresh in flight.
pub struct Waiter {
    ticket: u64,
    rx: oneshot::Receiver<Outcome>,
}

impl Waiter {
    /// Zero-based arrival sequence within the cycle.
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Suspend until the refresh settles.
    pub async fn wait(self) -> Outcome {
        self.rx.await.unwrap_or(Err(session::Error::Abandoned))
    }
}
