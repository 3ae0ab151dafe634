/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Logon rendezvous.
//!
//! Lets a caller block until the session layer reports that the counterparty
//! logged on or out. The last signalled state is kept, so callers that
//! arrive after the signal return immediately.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of a logon cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogonState {
    /// Logon accepted by the counterparty.
    Connected,
    /// Logout received.
    Disconnected,
}

/// One-shot synchronisation point for a logon cycle.
#[derive(Debug, Default)]
pub struct LogonRendezvous {
    state: Mutex<Option<LogonState>>,
    signalled: Condvar,
}

impl LogonRendezvous {
    /// Creates a rendezvous with no signal yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state and wakes every waiter.
    pub fn signal(&self, state: LogonState) {
        *self.state.lock() = Some(state);
        debug!("logon rendezvous signalled: {:?}", state);
        self.signalled.notify_all();
    }

    /// Blocks until a state has been signalled and returns it.
    pub fn wait(&self) -> LogonState {
        let mut state = self.state.lock();
        loop {
            if let Some(current) = *state {
                return current;
            }
            self.signalled.wait(&mut state);
        }
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    ///
    /// Returns `None` if nothing was signalled in time.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<LogonState> {
        let mut state = self.state.lock();
        if state.is_some() {
            return *state;
        }
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            drop(state);
            return Some(self.wait());
        };
        loop {
            if state.is_some() {
                return *state;
            }
            if self.signalled.wait_until(&mut state, deadline).timed_out() {
                return *state;
            }
        }
    }

    /// Returns the last signalled state without blocking.
    #[must_use]
    pub fn state(&self) -> Option<LogonState> {
        *self.state.lock()
    }

    /// Clears the state for a new logon cycle.
    pub fn reset(&self) {
        *self.state.lock() = None;
    }
}
