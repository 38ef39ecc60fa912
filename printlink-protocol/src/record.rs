//! Decoded records

use heapless::Vec;

/// One delimiter-terminated record, without its delimiter
///
/// Holds raw bytes. Text decoding is left to the consumer since the peer's
/// character set is a link setting, not a framing concern.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Record<const N: usize> {
    bytes: Vec<u8, N>,
}

impl<const N: usize> Record<N> {
    pub(crate) fn from_vec(bytes: Vec<u8, N>) -> Self {
        Self { bytes }
    }

    /// Create a record from a byte slice
    ///
    /// Returns `None` if `bytes` does not fit in `N`.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        Vec::from_slice(bytes).ok().map(Self::from_vec)
    }

    /// Record content
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the record, returning its byte buffer
    pub fn into_bytes(self) -> Vec<u8, N> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True if every byte is 7-bit ASCII
    pub fn is_ascii(&self) -> bool {
        self.bytes.is_ascii()
    }

    /// View the record as text if it is pure 7-bit ASCII
    pub fn as_ascii(&self) -> Option<&str> {
        if !self.is_ascii() {
            return None;
        }
        core::str::from_utf8(&self.bytes).ok()
    }
}

impl<const N: usize> AsRef<[u8]> for Record<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
