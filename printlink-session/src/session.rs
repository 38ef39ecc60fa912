//! Link session
//!
//! Owns one channel at a time: the read end lives on the receive thread,
//! the write end and the channel itself stay with the session.
//!
//! `send` and `close` take `&mut self`, so overlapping sends on one session
//! are ruled out at compile time. Share a session between threads behind a
//! `Mutex` if several callers need to send.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use printlink_hal::{Channel, ChannelEnd, ChannelTx};
use printlink_protocol::{encode_record, encoded_len, FrameDecoder};
use tracing::{debug, info, warn};

use crate::config::LinkConfig;
use crate::error::{BoxError, CloseError, ConnectError, SendError};
use crate::receiver::Receiver;
use crate::sink::RecordSink;
use crate::state::{SessionState, SharedState};
use crate::stats::{LinkCounters, LinkStats};
use crate::stop::StopToken;

/// Resources held while a channel is attached
struct ActiveLink<C: Channel> {
    channel: C,
    tx: C::Tx,
    stop: StopToken,
    receiver: Option<JoinHandle<Result<(), BoxError>>>,
}

/// A line-framed text link over a duplex channel
pub struct LinkSession<C>
where
    C: Channel,
    C::Error: std::error::Error + Send + Sync + 'static,
{
    config: LinkConfig,
    terminator: Vec<u8>,
    state: SharedState,
    counters: Arc<LinkCounters>,
    active: Option<ActiveLink<C>>,
}

impl<C> LinkSession<C>
where
    C: Channel,
    C::Error: std::error::Error + Send + Sync + 'static,
{
    /// Create an idle session
    pub fn new(config: LinkConfig) -> Self {
        let terminator = config.terminator_bytes();
        Self {
            config,
            terminator,
            state: SharedState::new(SessionState::Idle),
            counters: Arc::new(LinkCounters::default()),
            active: None,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// Snapshot of traffic counters
    pub fn stats(&self) -> LinkStats {
        self.counters.snapshot()
    }

    /// Attach `channel` and start the receive loop
    ///
    /// Records decoded from the channel are handed to `sink` on the receive
    /// thread. On any error the session stays Idle and the channel is
    /// dropped.
    pub fn open<S>(&mut self, mut channel: C, sink: S) -> Result<(), ConnectError>
    where
        C::Rx: Send + 'static,
        S: RecordSink,
    {
        match self.state() {
            SessionState::Idle => {}
            SessionState::Open | SessionState::Closing => return Err(ConnectError::AlreadyOpen),
            SessionState::Closed => return Err(ConnectError::Closed),
        }

        let (rx, mut tx) = channel.acquire().map_err(|e| {
            warn!(error = %e, "failed to acquire channel");
            ConnectError::Unavailable(e.into())
        })?;

        let stop = StopToken::new();
        let receiver = Receiver {
            rx,
            sink,
            decoder: FrameDecoder::new(self.config.delimiter),
            encoding: self.config.encoding,
            poll_interval: self.config.poll_interval(),
            read_chunk_size: self.config.read_chunk_size,
            stop: stop.clone(),
            state: self.state.clone(),
            counters: Arc::clone(&self.counters),
        };

        // Open before the loop starts, so a read failure on its first poll
        // can still move the session to Closing
        self.state.set(SessionState::Open);

        let spawned = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || receiver.run());

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "failed to spawn receive thread");
                self.state.set(SessionState::Idle);
                // The read end went down with the unspawned closure
                if let Err(error) = tx.close() {
                    warn!(%error, "failed to release write end");
                }
                if let Err(error) = channel.close() {
                    warn!(%error, "failed to release channel");
                }
                return Err(ConnectError::Spawn(e));
            }
        };

        info!(
            thread = %self.config.thread_name,
            delimiter = self.config.delimiter,
            "link opened"
        );

        self.active = Some(ActiveLink {
            channel,
            tx,
            stop,
            receiver: Some(handle),
        });
        Ok(())
    }

    /// Send one record: `text`, encoded, followed by the terminator
    ///
    /// Blocks until the write end has accepted every byte. A failed write is
    /// reported but leaves the session open.
    pub fn send(&mut self, text: &str) -> Result<(), SendError> {
        if self.state() != SessionState::Open {
            return Err(SendError::NotConnected);
        }
        let Some(active) = self.active.as_mut() else {
            return Err(SendError::NotConnected);
        };

        let body = self.config.encoding.encode(text);
        let mut frame = vec![0u8; encoded_len(&body, &self.terminator)];
        let len = encode_record(&body, &self.terminator, &mut frame).map_err(SendError::Frame)?;

        let written = active
            .tx
            .write_all(&frame[..len])
            .and_then(|()| active.tx.flush());

        if let Err(e) = written {
            let error: BoxError = e.into();
            warn!(%error, bytes = len, "send failed");
            return Err(SendError::Io(error));
        }

        debug!(bytes = len, "record sent");
        self.counters.add_sent(len);
        Ok(())
    }

    /// Stop the receive loop and release the channel
    ///
    /// Releases the read end, the write end and the channel, in that order.
    /// Every release is attempted; the first failure is returned. Calling
    /// `close` again, or on a session that never opened, does nothing.
    ///
    /// Waits for the receive loop to finish its current iteration, which is
    /// bounded by one poll interval plus the delivery of one chunk. Records
    /// already read are still delivered before the loop exits.
    ///
    /// When called from the sink itself the loop is not awaited, so the
    /// ordering above does not hold: the write end and the channel are
    /// released first, and the loop releases the read end once the sink
    /// returns. A read end failure is then only logged.
    pub fn close(&mut self) -> Result<(), CloseError> {
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };

        self.state.transition(SessionState::Open, SessionState::Closing);
        active.stop.stop();
        debug!("stop requested");

        let mut first_failure: Option<CloseError> = None;
        let mut note = |end: ChannelEnd, source: BoxError| {
            warn!(%end, error = %source, "release failed");
            if first_failure.is_none() {
                first_failure = Some(CloseError::Release { end, source });
            }
        };

        if let Some(handle) = active.receiver.take() {
            if handle.thread().id() == thread::current().id() {
                debug!("close called from receive loop, not waiting for it");
            } else {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(source)) => note(ChannelEnd::Read, source),
                    Err(_) => warn!("receive loop panicked, read end dropped without release"),
                }
            }
        }

        if let Err(e) = active.tx.close() {
            note(ChannelEnd::Write, e.into());
        }
        if let Err(e) = active.channel.close() {
            note(ChannelEnd::Channel, e.into());
        }

        self.state.set(SessionState::Closed);
        info!("link closed");

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<C> Drop for LinkSession<C>
where
    C: Channel,
    C::Error: std::error::Error + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if self.active.is_some() {
            if let Err(error) = self.close() {
                warn!(%error, "error closing link on drop");
            }
        }
    }
}
