//! printlink line protocol
//!
//! This crate defines the framing used between a host and a line-oriented
//! serial peer such as a Bluetooth receipt printer. The protocol has no
//! header, length or checksum: a record is every byte up to a single
//! delimiter byte.
//!
//! # Protocol Overview
//!
//! Inbound (peer → host):
//! ```text
//! ┌──────────────────────┬───────┐
//! │ RECORD BYTES         │ DELIM │
//! │ 0–N bytes, not DELIM │ 0x0A  │
//! └──────────────────────┴───────┘
//! ```
//!
//! Outbound (host → peer):
//! ```text
//! ┌──────────────────────┬────────────────┐
//! │ TEXT                 │ TERMINATOR     │
//! │ encoded text         │ "\n\n\n"       │
//! └──────────────────────┴────────────────┘
//! ```
//!
//! The outbound terminator is three line feeds so the printer flushes and
//! feeds paper past the tear bar.
//!
//! Inbound records are reassembled from chunks of any size by
//! [`FrameDecoder`]. Its buffer has a fixed capacity; a record longer than
//! that is dropped and the decoder resynchronises at the next delimiter.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod decoder;
pub mod encoder;
pub mod record;

pub use decoder::{Feed, FrameDecoder, FrameError, DEFAULT_DELIMITER, DEFAULT_RECORD_CAPACITY};
pub use encoder::{encode_record, encoded_len, DEFAULT_TERMINATOR};
pub use record::Record;
