//! Background receive loop
//!
//! Runs on its own thread for the lifetime of an open session. The
//! accumulation buffer lives here and nowhere else.
//!
//! Each iteration:
//! 1. Check the stop token
//! 2. Ask the read end how many bytes are ready
//! 3. None: sleep one poll interval
//! 4. Some: read them, feed the decoder, deliver every completed record
//!
//! A read error ends the loop. Once a chunk has been read it is always
//! decoded and delivered in full before the stop token is checked again.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use printlink_hal::ChannelRx;
use printlink_protocol::{FrameDecoder, FrameError, Record, DEFAULT_RECORD_CAPACITY};
use tracing::{debug, trace, warn};

use crate::encoding::TextEncoding;
use crate::error::BoxError;
use crate::sink::{LinkWarning, RecordSink};
use crate::state::{SessionState, SharedState};
use crate::stats::LinkCounters;
use crate::stop::StopToken;

/// Longest inbound record a session delivers, in bytes
pub const RECORD_CAPACITY: usize = DEFAULT_RECORD_CAPACITY;

pub(crate) struct Receiver<R, S> {
    pub(crate) rx: R,
    pub(crate) sink: S,
    pub(crate) decoder: FrameDecoder<RECORD_CAPACITY>,
    pub(crate) encoding: TextEncoding,
    pub(crate) poll_interval: Duration,
    pub(crate) read_chunk_size: usize,
    pub(crate) stop: StopToken,
    pub(crate) state: SharedState,
    pub(crate) counters: Arc<LinkCounters>,
}

impl<R, S> Receiver<R, S>
where
    R: ChannelRx,
    R::Error: Into<BoxError>,
    S: RecordSink,
{
    /// Run until stopped or the read end fails, then release the read end
    pub(crate) fn run(self) -> Result<(), BoxError> {
        let Receiver {
            mut rx,
            mut sink,
            mut decoder,
            encoding,
            poll_interval,
            read_chunk_size,
            stop,
            state,
            counters,
        } = self;

        let mut scratch = vec![0u8; read_chunk_size];
        debug!(poll_ms = poll_interval.as_millis() as u64, "receive loop started");

        while !stop.is_stopped() {
            let polled = decoder.poll(&mut rx, &mut scratch, |item| {
                deliver(item, encoding, &mut sink, &counters)
            });

            match polled {
                Ok(0) => thread::sleep(poll_interval),
                Ok(n) => {
                    trace!(bytes = n, "chunk received");
                    counters.add_received(n);
                }
                Err(e) => {
                    let error: BoxError = e.into();
                    warn!(%error, "read failed, stopping receive loop");
                    state.transition(SessionState::Open, SessionState::Closing);
                    stop.stop();
                    sink.on_warning(LinkWarning::ReadFailed(error));
                }
            }
        }

        if !decoder.pending().is_empty() {
            debug!(bytes = decoder.position(), "discarding partial record");
        }

        let released = rx.close().map_err(Into::into);
        if let Err(error) = &released {
            warn!(%error, "failed to release read end");
        }

        state.set(SessionState::Closed);
        debug!("receive loop exited");
        released
    }
}

fn deliver<S: RecordSink>(
    item: Result<Record<RECORD_CAPACITY>, FrameError>,
    encoding: TextEncoding,
    sink: &mut S,
    counters: &LinkCounters,
) {
    match item {
        Ok(record) => {
            sink.on_record(encoding.decode(record.as_bytes()));
            counters.record_delivered();
        }
        Err(FrameError::Overflow) => {
            warn!(capacity = RECORD_CAPACITY, "record overflowed receive buffer, resyncing");
            counters.overflowed();
            sink.on_warning(LinkWarning::Overflow {
                capacity: RECORD_CAPACITY,
            });
        }
        Err(FrameError::BufferTooSmall) => {
            // Decoding never sizes a caller buffer
            debug!("unexpected encoder error while decoding");
        }
    }
}
