//! TCP socket channel
//!
//! Lets a session run over a plain socket, e.g. a network receipt printer
//! on port 9100 or a serial-to-TCP bridge. The stream must already be
//! connected.
//!
//! Availability is probed with a short `peek` under a read timeout. Read
//! timeouts only affect the read path, so the write end keeps blocking
//! semantics. End of stream is reported as an error, which ends the
//! receive loop.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use printlink_hal::{Channel, ChannelRx, ChannelTx};

/// How long one availability probe may wait for data
pub const DEFAULT_PEEK_TIMEOUT: Duration = Duration::from_millis(1);

const PEEK_LEN: usize = 1024;

/// Connected TCP stream as a printlink channel
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    peek_timeout: Duration,
    acquired: bool,
}

impl TcpChannel {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_peek_timeout(stream, DEFAULT_PEEK_TIMEOUT)
    }

    /// `peek_timeout` must be non-zero
    pub fn with_peek_timeout(stream: TcpStream, peek_timeout: Duration) -> Self {
        Self {
            stream,
            peek_timeout,
            acquired: false,
        }
    }
}

impl Channel for TcpChannel {
    type Error = io::Error;
    type Rx = TcpRx;
    type Tx = TcpTx;

    fn acquire(&mut self) -> io::Result<(TcpRx, TcpTx)> {
        if self.acquired {
            return Err(io::Error::new(ErrorKind::AlreadyExists, "channel ends already acquired"));
        }

        let read = self.stream.try_clone()?;
        read.set_read_timeout(Some(self.peek_timeout))?;
        let write = self.stream.try_clone()?;
        self.acquired = true;

        Ok((
            TcpRx {
                stream: read,
                peek: vec![0u8; PEEK_LEN],
            },
            TcpTx { stream: write },
        ))
    }

    fn close(&mut self) -> io::Result<()> {
        ignore_not_connected(self.stream.shutdown(Shutdown::Both))
    }
}

/// Read half of a [`TcpChannel`]
#[derive(Debug)]
pub struct TcpRx {
    stream: TcpStream,
    peek: Vec<u8>,
}

impl ChannelRx for TcpRx {
    type Error = io::Error;

    fn bytes_available(&mut self) -> io::Result<usize> {
        match self.stream.peek(&mut self.peek) {
            Ok(0) => Err(io::Error::new(ErrorKind::UnexpectedEof, "peer closed the connection")),
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(0),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        ignore_not_connected(self.stream.shutdown(Shutdown::Read))
    }
}

/// Write half of a [`TcpChannel`]
#[derive(Debug)]
pub struct TcpTx {
    stream: TcpStream,
}

impl ChannelTx for TcpTx {
    type Error = io::Error;

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        Write::write_all(&mut self.stream, data)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.stream)
    }

    fn close(&mut self) -> io::Result<()> {
        ignore_not_connected(self.stream.shutdown(Shutdown::Write))
    }
}

/// A peer that already hung up leaves nothing to shut down
fn ignore_not_connected(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}
