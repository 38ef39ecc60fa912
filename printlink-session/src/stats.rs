//! Link traffic counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the session and its receive loop
#[derive(Debug, Default)]
pub(crate) struct LinkCounters {
    bytes_received: AtomicU64,
    bytes_sent: AtomicU64,
    records_delivered: AtomicU64,
    overflows: AtomicU64,
}

impl LinkCounters {
    pub(crate) fn add_received(&self, n: usize) {
        self.bytes_received.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn add_sent(&self, n: usize) {
        self.bytes_sent.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.records_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn overflowed(&self) {
        self.overflows.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> LinkStats {
        LinkStats {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            records_delivered: self.records_delivered.load(Ordering::Relaxed),
            overflows: self.overflows.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a session's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Bytes read from the channel
    pub bytes_received: u64,
    /// Bytes written to the channel, terminators included
    pub bytes_sent: u64,
    /// Records handed to the sink
    pub records_delivered: u64,
    /// Records dropped for exceeding the receive buffer
    pub overflows: u64,
}
