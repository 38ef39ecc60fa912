//! Duplex byte channel abstractions
//!
//! A channel is split into a read end, driven by the receive loop on its own
//! thread, and a write end, driven by the caller. The channel value itself
//! stays with the session and is released last.

/// Read end of a channel
///
/// Reads never block waiting for data: the receive loop asks how many bytes
/// are ready and only then reads them.
pub trait ChannelRx {
    /// Error type for receive operations
    type Error;

    /// Number of bytes that can be read right now without blocking
    ///
    /// Zero means "nothing yet", not end of stream.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read up to `buf.len()` bytes into `buf`
    ///
    /// Returns the number of bytes read.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Release the read end
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Read whatever is available, bounded by `buf.len()`
    ///
    /// Returns `Ok(0)` without touching the transport's read path when no
    /// bytes are ready.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let available = self.bytes_available()?;
        if available == 0 || buf.is_empty() {
            return Ok(0);
        }
        let len = available.min(buf.len());
        self.read_into(&mut buf[..len])
    }
}

/// Write end of a channel
pub trait ChannelTx {
    /// Error type for transmit operations
    type Error;

    /// Write all of `data`, in order
    ///
    /// Blocks until every byte has been handed to the transport or an error
    /// occurs.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Release the write end
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// A connected duplex channel
///
/// Both ends share the channel's error type so a session can report failures
/// from any of them uniformly.
pub trait Channel {
    /// Error type shared by the channel and both of its ends
    type Error;
    /// Read end handed to the receive loop
    type Rx: ChannelRx<Error = Self::Error>;
    /// Write end kept by the sender
    type Tx: ChannelTx<Error = Self::Error>;

    /// Take exclusive ownership of the read and write ends
    ///
    /// Fails when the channel is not connected or its ends were already
    /// taken.
    fn acquire(&mut self) -> Result<(Self::Rx, Self::Tx), Self::Error>;

    /// Release the channel itself
    ///
    /// Called after both ends have been released.
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// Identifies which part of a channel an operation touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelEnd {
    /// The read end
    Read,
    /// The write end
    Write,
    /// The channel itself
    Channel,
}

impl ChannelEnd {
    /// Short lowercase name, for messages
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelEnd::Read => "read end",
            ChannelEnd::Write => "write end",
            ChannelEnd::Channel => "channel",
        }
    }
}

impl core::fmt::Display for ChannelEnd {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
