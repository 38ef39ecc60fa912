//! printlink session
//!
//! Runs a line-framed text link over any [`Channel`](printlink_hal::Channel):
//! a background thread drains the read end, reassembles records and hands
//! them to a [`RecordSink`]; the caller sends terminated records on the
//! write end.
//!
//! ```no_run
//! use std::net::TcpStream;
//! use printlink_session::{LinkConfig, LinkSession, TcpChannel};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = TcpStream::connect("192.168.1.50:9100")?;
//! let mut session = LinkSession::new(LinkConfig::default());
//! session.open(TcpChannel::new(stream), |record: String| {
//!     println!("printer: {record}");
//! })?;
//!
//! session.send("hello")?;
//! session.close()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod encoding;
pub mod error;
mod receiver;
pub mod session;
pub mod sink;
pub mod state;
pub mod stats;
pub mod stop;
pub mod tcp;

#[cfg(test)]
mod testing;

pub use config::{LinkConfig, DEFAULT_POLL_INTERVAL_MS, DEFAULT_THREAD_NAME};
pub use encoding::TextEncoding;
pub use error::{BoxError, CloseError, ConfigError, ConnectError, SendError};
pub use receiver::RECORD_CAPACITY;
pub use session::LinkSession;
pub use sink::{ChannelSink, LinkEvent, LinkWarning, RecordSink};
pub use state::SessionState;
pub use stats::LinkStats;
pub use stop::StopToken;
pub use tcp::{TcpChannel, TcpRx, TcpTx};

pub use printlink_hal::{Channel, ChannelEnd, ChannelRx, ChannelTx};
