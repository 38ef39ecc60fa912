//! Outbound record encoding
//!
//! An outbound record is the already-encoded text followed by the link's
//! terminator. Nothing in the text is escaped; a delimiter inside the text
//! simply reaches the peer as a line break.

use crate::decoder::FrameError;

/// Default outbound terminator: three line feeds, so the printer flushes
/// its line buffer and advances the paper
pub const DEFAULT_TERMINATOR: &[u8] = b"\n\n\n";

/// Size in bytes of `text` once terminated
pub fn encoded_len(text: &[u8], terminator: &[u8]) -> usize {
    text.len() + terminator.len()
}

/// Encode `text` followed by `terminator` into `buffer`
///
/// Returns the number of bytes written
pub fn encode_record(
    text: &[u8],
    terminator: &[u8],
    buffer: &mut [u8],
) -> Result<usize, FrameError> {
    let len = encoded_len(text, terminator);
    if buffer.len() < len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[..text.len()].copy_from_slice(text);
    buffer[text.len()..len].copy_from_slice(terminator);

    Ok(len)
}
