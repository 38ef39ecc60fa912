//! Session lifecycle
//!
//! ```text
//!  Idle ──open──▶ Open ──close / read failure──▶ Closing ──loop exits──▶ Closed
//! ```
//!
//! A failed `open` leaves the session Idle. Nothing leaves Closed.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// No channel yet
    Idle = 0,
    /// Channel acquired, receive loop running
    Open = 1,
    /// Stop requested, receive loop may still be mid-iteration
    Closing = 2,
    /// Receive loop exited
    Closed = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Idle,
            1 => SessionState::Open,
            2 => SessionState::Closing,
            _ => SessionState::Closed,
        }
    }
}

/// State cell shared with the receive loop
#[derive(Debug, Clone)]
pub(crate) struct SharedState(Arc<AtomicU8>);

impl SharedState {
    pub(crate) fn new(state: SessionState) -> Self {
        Self(Arc::new(AtomicU8::new(state as u8)))
    }

    pub(crate) fn get(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: SessionState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move from `from` to `to`; returns false if the state was not `from`
    pub(crate) fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
