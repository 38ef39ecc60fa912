//! Link configuration
//!
//! All keys are optional; missing keys take their defaults.
//!
//! ```toml
//! delimiter = 10            # record delimiter byte
//! poll_interval_ms = 50     # sleep between empty polls
//! send_terminator = "\n\n\n"
//! encoding = "ascii"        # ascii | latin1 | utf8
//! read_chunk_size = 1024    # max bytes pulled per read
//! thread_name = "printlink-rx"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use printlink_protocol::{DEFAULT_DELIMITER, DEFAULT_RECORD_CAPACITY, DEFAULT_TERMINATOR};
use serde::Deserialize;

use crate::encoding::TextEncoding;
use crate::error::ConfigError;

/// Default sleep between polls that found no data
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default receive thread name
pub const DEFAULT_THREAD_NAME: &str = "printlink-rx";

/// Session settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Byte that ends an inbound record
    pub delimiter: u8,
    /// Sleep between polls that found no data, in milliseconds
    pub poll_interval_ms: u64,
    /// Appended to every outbound record
    pub send_terminator: String,
    /// Character encoding of record text
    pub encoding: TextEncoding,
    /// Upper bound on bytes pulled from the channel per read
    pub read_chunk_size: usize,
    /// Name of the receive thread
    pub thread_name: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            send_terminator: String::from_utf8_lossy(DEFAULT_TERMINATOR).into_owned(),
            encoding: TextEncoding::Ascii,
            read_chunk_size: DEFAULT_RECORD_CAPACITY,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl LinkConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be greater than 0".into()));
        }
        if self.read_chunk_size == 0 {
            return Err(ConfigError::Invalid("read_chunk_size must be greater than 0".into()));
        }
        if self.send_terminator.is_empty() {
            return Err(ConfigError::Invalid("send_terminator must not be empty".into()));
        }
        if self.thread_name.is_empty() || self.thread_name.contains('\0') {
            return Err(ConfigError::Invalid(
                "thread_name must be a non-empty string without NUL".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Terminator bytes under the configured encoding
    pub fn terminator_bytes(&self) -> Vec<u8> {
        self.encoding.encode(&self.send_terminator)
    }
}
