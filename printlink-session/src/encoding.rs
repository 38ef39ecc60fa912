//! Character encodings for record text
//!
//! Line printers speak single-byte character sets. Bytes that the selected
//! set cannot represent decode to U+FFFD; characters it cannot represent
//! encode to `?`.

use serde::Deserialize;

/// Character encoding of the text carried by records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// 7-bit US-ASCII
    #[default]
    Ascii,
    /// ISO-8859-1
    Latin1,
    /// UTF-8
    Utf8,
}

impl TextEncoding {
    /// Decode record bytes to text
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
                .collect(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Encode text to bytes
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
        }
    }
}
