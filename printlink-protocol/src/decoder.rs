//! Incremental record reassembly
//!
//! Bytes arrive in chunks whose boundaries have nothing to do with record
//! boundaries. A record may span many chunks and one chunk may complete many
//! records. [`FrameDecoder`] keeps the partial record between calls.
//!
//! Framing rules:
//! - Every delimiter byte ends exactly one record and is not part of it
//! - Every other byte is appended to the pending record
//! - A pending record that outgrows the buffer is dropped; input is then
//!   discarded up to and including the next delimiter

use heapless::Vec;
use printlink_hal::ChannelRx;

use crate::record::Record;

/// Default record delimiter (line feed)
pub const DEFAULT_DELIMITER: u8 = b'\n';

/// Default accumulation buffer size in bytes
pub const DEFAULT_RECORD_CAPACITY: usize = 1024;

/// Errors that can occur while decoding or encoding records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Pending record exceeded the buffer capacity and was dropped
    Overflow,
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::Overflow => f.write_str("record exceeded buffer capacity"),
            FrameError::BufferTooSmall => f.write_str("buffer too small for record"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Appending bytes to the pending record
    Accumulating,
    /// Dropping bytes until the next delimiter
    Discarding,
}

/// Stateful byte-to-record reassembler
///
/// `N` is the accumulation buffer capacity, i.e. the longest record that can
/// be delivered.
#[derive(Debug, Clone)]
pub struct FrameDecoder<const N: usize = DEFAULT_RECORD_CAPACITY> {
    buffer: Vec<u8, N>,
    delimiter: u8,
    state: DecodeState,
}

impl<const N: usize> Default for FrameDecoder<N> {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl<const N: usize> FrameDecoder<N> {
    /// Create a decoder that splits on `delimiter`
    pub fn new(delimiter: u8) -> Self {
        Self {
            buffer: Vec::new(),
            delimiter,
            state: DecodeState::Accumulating,
        }
    }

    /// Drop any pending bytes and leave discard mode
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = DecodeState::Accumulating;
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Write cursor: number of bytes in the pending record
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes of the record received so far
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// True while skipping the tail of an oversized record
    pub fn is_discarding(&self) -> bool {
        self.state == DecodeState::Discarding
    }

    /// Feed a single byte to the decoder
    ///
    /// Returns `Ok(Some(record))` when the byte completes a record,
    /// `Ok(None)` when more bytes are needed, or `Err(Overflow)` the moment
    /// a pending record is dropped for exceeding the buffer.
    pub fn push(&mut self, byte: u8) -> Result<Option<Record<N>>, FrameError> {
        if byte == self.delimiter {
            return Ok(match self.state {
                DecodeState::Accumulating => {
                    Some(Record::from_vec(core::mem::take(&mut self.buffer)))
                }
                DecodeState::Discarding => {
                    // Tail of the dropped record ends here
                    self.state = DecodeState::Accumulating;
                    None
                }
            });
        }

        match self.state {
            DecodeState::Discarding => Ok(None),
            DecodeState::Accumulating => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.state = DecodeState::Discarding;
                    return Err(FrameError::Overflow);
                }
                Ok(None)
            }
        }
    }

    /// Feed a chunk of bytes to the decoder
    ///
    /// The returned iterator yields every record completed by `chunk`, in
    /// order. Bytes are consumed as the iterator advances; drive it to the
    /// end (or call [`Feed::remaining`]) to account for the whole chunk.
    pub fn feed<'d, 'c>(&'d mut self, chunk: &'c [u8]) -> Feed<'d, 'c, N> {
        Feed {
            decoder: self,
            chunk,
        }
    }

    /// Feed a whole chunk, handing each result to `on_item`
    pub fn feed_with<F>(&mut self, chunk: &[u8], mut on_item: F)
    where
        F: FnMut(Result<Record<N>, FrameError>),
    {
        for item in self.feed(chunk) {
            on_item(item);
        }
    }

    /// Read whatever the channel has ready into `scratch` and feed it
    ///
    /// Returns the number of bytes consumed; `Ok(0)` means nothing was
    /// available. A read error leaves the decoder untouched.
    pub fn poll<R, F>(
        &mut self,
        rx: &mut R,
        scratch: &mut [u8],
        on_item: F,
    ) -> Result<usize, R::Error>
    where
        R: ChannelRx,
        F: FnMut(Result<Record<N>, FrameError>),
    {
        let n = rx.read_available(scratch)?;
        if n > 0 {
            self.feed_with(&scratch[..n], on_item);
        }
        Ok(n)
    }
}

/// Iterator over the records completed by one chunk
///
/// Created by [`FrameDecoder::feed`].
pub struct Feed<'d, 'c, const N: usize> {
    decoder: &'d mut FrameDecoder<N>,
    chunk: &'c [u8],
}

impl<'c, const N: usize> Feed<'_, 'c, N> {
    /// Bytes of the chunk not yet consumed
    pub fn remaining(&self) -> &'c [u8] {
        self.chunk
    }
}

impl<const N: usize> Iterator for Feed<'_, '_, N> {
    type Item = Result<Record<N>, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((&byte, rest)) = self.chunk.split_first() {
            self.chunk = rest;
            match self.decoder.push(byte) {
                Ok(None) => continue,
                Ok(Some(record)) => return Some(Ok(record)),
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec as StdVec;

    type Decoder = FrameDecoder<64>;

    fn collect<const N: usize>(
        decoder: &mut FrameDecoder<N>,
        chunk: &[u8],
    ) -> StdVec<Result<StdVec<u8>, FrameError>> {
        decoder
            .feed(chunk)
            .map(|item| item.map(|record| record.as_bytes().to_vec()))
            .collect()
    }

    #[test]
    fn test_records_across_chunks() {
        let mut decoder = Decoder::default();

        assert_eq!(collect(&mut decoder, b"AB\n"), [Ok(b"AB".to_vec())]);
        assert_eq!(collect(&mut decoder, b"CD\n12"), [Ok(b"CD".to_vec())]);
        assert_eq!(decoder.pending(), b"12");
        assert_eq!(decoder.position(), 2);
    }

    #[test]
    fn test_consecutive_delimiters_yield_empty_records() {
        let mut decoder = Decoder::default();

        let records = collect(&mut decoder, b"\n\n");
        assert_eq!(records, [Ok(StdVec::new()), Ok(StdVec::new())]);
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn test_record_split_byte_by_byte() {
        let mut decoder = Decoder::default();

        for &byte in b"READY" {
            assert_eq!(decoder.push(byte), Ok(None));
        }
        let record = decoder.push(b'\n').unwrap().unwrap();
        assert_eq!(record.as_ascii(), Some("READY"));
    }

    #[test]
    fn test_custom_delimiter() {
        let mut decoder = FrameDecoder::<16>::new(b';');

        let records = collect(&mut decoder, b"a\nb;c;");
        assert_eq!(records, [Ok(b"a\nb".to_vec()), Ok(b"c".to_vec())]);
        assert_eq!(decoder.delimiter(), b';');
    }

    #[test]
    fn test_record_exactly_at_capacity() {
        let mut decoder = FrameDecoder::<4>::default();

        assert_eq!(collect(&mut decoder, b"1234\n"), [Ok(b"1234".to_vec())]);
        assert!(!decoder.is_discarding());
    }

    #[test]
    fn test_overflow_resyncs_at_next_delimiter() {
        let mut decoder = FrameDecoder::<4>::default();

        let items = collect(&mut decoder, b"abcdefg\nxy\n");
        assert_eq!(items, [Err(FrameError::Overflow), Ok(b"xy".to_vec())]);
        assert!(!decoder.is_discarding());
    }

    #[test]
    fn test_overflow_reported_once_per_record() {
        let mut decoder = FrameDecoder::<2>::default();

        // Oversized record spread over several chunks
        assert_eq!(collect(&mut decoder, b"abc"), [Err(FrameError::Overflow)]);
        assert!(decoder.is_discarding());
        assert_eq!(decoder.position(), 0);
        assert!(collect(&mut decoder, b"defgh").is_empty());
        assert!(collect(&mut decoder, b"ij\n").is_empty());
        assert!(!decoder.is_discarding());

        assert_eq!(collect(&mut decoder, b"ok\n"), [Ok(b"ok".to_vec())]);
    }

    #[test]
    fn test_reset_clears_pending_and_discard() {
        let mut decoder = FrameDecoder::<2>::default();
        let _ = collect(&mut decoder, b"abc");
        assert!(decoder.is_discarding());

        decoder.reset();
        assert!(!decoder.is_discarding());
        assert_eq!(collect(&mut decoder, b"z\n"), [Ok(b"z".to_vec())]);
    }

    #[test]
    fn test_feed_is_resumable() {
        let mut decoder = Decoder::default();
        let mut feed = decoder.feed(b"one\ntwo\nthr");

        let first = feed.next().unwrap().unwrap();
        assert_eq!(first.as_bytes(), b"one");
        assert_eq!(feed.remaining(), b"two\nthr");

        let rest: StdVec<_> = feed.collect();
        assert_eq!(rest.len(), 1);
        assert_eq!(decoder.pending(), b"thr");
    }

    #[test]
    fn test_feed_with_visits_every_record() {
        let mut decoder = Decoder::default();
        let mut seen = StdVec::new();

        decoder.feed_with(b"1\n2\n3\n4", |item| seen.push(item.unwrap().as_bytes().to_vec()));
        assert_eq!(seen, [b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
        assert_eq!(decoder.pending(), b"4");
    }

    struct ScriptRx {
        data: StdVec<u8>,
        fail: bool,
    }

    impl ChannelRx for ScriptRx {
        type Error = &'static str;

        fn bytes_available(&mut self) -> Result<usize, Self::Error> {
            if self.fail {
                return Err("link down");
            }
            Ok(self.data.len())
        }

        fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data.drain(..n);
            Ok(n)
        }

        fn close(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_poll_reads_available_bytes() {
        let mut decoder = Decoder::default();
        let mut rx = ScriptRx {
            data: b"OK\nBUSY\nPA".to_vec(),
            fail: false,
        };
        let mut scratch = [0u8; 6];
        let mut records = StdVec::new();

        let n = decoder
            .poll(&mut rx, &mut scratch, |item| records.push(item.unwrap()))
            .unwrap();
        assert_eq!(n, 6);
        assert_eq!(records.len(), 1);

        let n = decoder
            .poll(&mut rx, &mut scratch, |item| records.push(item.unwrap()))
            .unwrap();
        assert_eq!(n, 4);
        assert_eq!(records[1].as_bytes(), b"BUSY");
        assert_eq!(decoder.pending(), b"PA");

        let n = decoder.poll(&mut rx, &mut scratch, |_| {}).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_poll_propagates_read_error() {
        let mut decoder = Decoder::default();
        decoder.feed_with(b"par", |_| {});
        let mut rx = ScriptRx {
            data: StdVec::new(),
            fail: true,
        };
        let mut scratch = [0u8; 8];

        assert_eq!(decoder.poll(&mut rx, &mut scratch, |_| {}), Err("link down"));
        assert_eq!(decoder.pending(), b"par");
    }

    /// Split `bytes` at the given chunk lengths (cycled until exhausted)
    fn split_chunks<'a>(bytes: &'a [u8], sizes: &[usize]) -> StdVec<&'a [u8]> {
        let mut chunks = StdVec::new();
        let mut rest = bytes;
        let mut i = 0;
        while !rest.is_empty() {
            let n = sizes[i % sizes.len()].min(rest.len());
            chunks.push(&rest[..n]);
            rest = &rest[n..];
            i += 1;
        }
        chunks
    }

    fn stream_bytes() -> impl Strategy<Value = StdVec<u8>> {
        prop::collection::vec(prop_oneof![1 => Just(b'\n'), 4 => any::<u8>()], 0..512)
    }

    proptest! {
        #[test]
        fn prop_chunking_does_not_change_records(
            bytes in stream_bytes(),
            sizes in prop::collection::vec(1usize..48, 1..16),
        ) {
            // Capacity above the input length, so no record can overflow
            let mut whole = FrameDecoder::<512>::default();
            let expected: StdVec<_> = collect(&mut whole, &bytes);

            let mut chunked = FrameDecoder::<512>::default();
            let mut actual = StdVec::new();
            for chunk in split_chunks(&bytes, &sizes) {
                actual.extend(collect(&mut chunked, chunk));
            }

            prop_assert_eq!(&actual, &expected);
            prop_assert_eq!(chunked.pending(), whole.pending());

            // Same as splitting once on the delimiter, minus the trailing fragment
            let mut reference: StdVec<StdVec<u8>> =
                bytes.split(|&b| b == b'\n').map(|s| s.to_vec()).collect();
            reference.pop();
            let records: StdVec<StdVec<u8>> = actual.into_iter().map(|r| r.unwrap()).collect();
            prop_assert_eq!(records, reference);
        }

        #[test]
        fn prop_records_and_pending_rebuild_input(
            bytes in stream_bytes(),
            sizes in prop::collection::vec(1usize..48, 1..16),
        ) {
            let mut decoder = FrameDecoder::<512>::default();
            let mut rebuilt = StdVec::new();
            for chunk in split_chunks(&bytes, &sizes) {
                for record in decoder.feed(chunk) {
                    rebuilt.extend_from_slice(record.unwrap().as_bytes());
                    rebuilt.push(b'\n');
                }
            }
            rebuilt.extend_from_slice(decoder.pending());

            prop_assert_eq!(rebuilt, bytes);
        }
    }
}
