//! Session errors
//!
//! | Error | Raised by | Session afterwards |
//! |-------|-----------|--------------------|
//! | [`ConnectError`] | [`open`](crate::LinkSession::open) | unchanged (Idle stays Idle) |
//! | [`SendError::NotConnected`] | [`send`](crate::LinkSession::send) | unchanged |
//! | [`SendError::Io`] | [`send`](crate::LinkSession::send) | still Open |
//! | [`CloseError`] | [`close`](crate::LinkSession::close) | Closed |
//! | [`ConfigError`] | [`LinkConfig`](crate::LinkConfig) loading | n/a |
//!
//! Read failures inside the receive loop never reach the caller as a
//! `Result`; they stop the loop and are surfaced to the sink as
//! [`LinkWarning::ReadFailed`](crate::LinkWarning::ReadFailed).

use printlink_hal::ChannelEnd;
use printlink_protocol::FrameError;
use thiserror::Error;

/// Type-erased transport error
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to open a session
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The channel could not hand out its read and write ends
    #[error("channel unavailable: {0}")]
    Unavailable(#[source] BoxError),

    /// The session already has a live channel
    #[error("session is already open")]
    AlreadyOpen,

    /// The session was closed; sessions are not reusable
    #[error("session is closed")]
    Closed,

    /// The receive thread could not be started
    #[error("failed to start receive loop: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Failure to send a record
#[derive(Debug, Error)]
pub enum SendError {
    /// No open session
    #[error("not connected")]
    NotConnected,

    /// Outbound record could not be framed
    #[error("framing failed: {0}")]
    Frame(FrameError),

    /// The write end rejected the record; the session stays open
    #[error("write failed: {0}")]
    Io(#[source] BoxError),
}

/// Failure while releasing channel resources
///
/// Only the first failure is reported; every release is still attempted.
#[derive(Debug, Error)]
pub enum CloseError {
    #[error("failed to release {end}: {source}")]
    Release {
        /// Which part of the channel failed to close
        end: ChannelEnd,
        source: BoxError,
    },
}

impl CloseError {
    /// Which part of the channel failed to close
    pub fn end(&self) -> ChannelEnd {
        match self {
            CloseError::Release { end, .. } => *end,
        }
    }
}

/// Failure to load or validate a [`LinkConfig`](crate::LinkConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
