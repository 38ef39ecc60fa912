//! Record delivery
//!
//! The receive loop hands records to a [`RecordSink`] on its own thread.
//! Hosts that need records on a specific thread (a UI loop, an async
//! runtime) use [`ChannelSink`] and drain the receiver wherever they like.

use crossbeam::channel::Sender;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::BoxError;

/// Non-record conditions surfaced by the receive loop
#[derive(Debug, Error)]
pub enum LinkWarning {
    /// A record outgrew the receive buffer and was dropped; reception
    /// resumes after the next delimiter
    #[error("record longer than {capacity} bytes dropped")]
    Overflow { capacity: usize },

    /// The read end failed; the receive loop has stopped
    #[error("read failed: {0}")]
    ReadFailed(#[source] BoxError),
}

/// Consumer of decoded records
///
/// Called from the receive thread, one record at a time, in arrival order.
pub trait RecordSink: Send + 'static {
    /// Deliver one decoded record
    fn on_record(&mut self, record: String);

    /// Surface a warning. Logs by default.
    fn on_warning(&mut self, warning: LinkWarning) {
        warn!(%warning, "link warning");
    }
}

impl<F> RecordSink for F
where
    F: FnMut(String) + Send + 'static,
{
    fn on_record(&mut self, record: String) {
        self(record)
    }
}

/// Events forwarded by [`ChannelSink`]
#[derive(Debug)]
pub enum LinkEvent {
    Record(String),
    Warning(LinkWarning),
}

/// Sink that forwards every record and warning to a crossbeam channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<LinkEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<LinkEvent>) -> Self {
        Self { tx }
    }
}

impl RecordSink for ChannelSink {
    fn on_record(&mut self, record: String) {
        if self.tx.send(LinkEvent::Record(record)).is_err() {
            debug!("event receiver dropped, discarding record");
        }
    }

    fn on_warning(&mut self, warning: LinkWarning) {
        if let Err(e) = self.tx.send(LinkEvent::Warning(warning)) {
            // Nobody is listening any more; keep the diagnostic
            if let LinkEvent::Warning(warning) = e.0 {
                warn!(%warning, "link warning");
            }
        }
    }
}
