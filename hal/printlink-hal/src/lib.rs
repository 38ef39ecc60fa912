//! printlink channel abstraction layer
//!
//! This crate defines the traits a transport must implement to carry a
//! printlink session. A transport is anything that moves bytes both ways once
//! connected: an RFCOMM socket to a receipt printer, a UART bridge, a TCP
//! stream. Establishing the connection is the host's job; the session only
//! ever sees an already-connected channel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  printlink-session (receive loop, send) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  printlink-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┼───────────┐
//!         ▼           ▼           ▼
//!     RFCOMM        UART         TCP
//! ```
//!
//! # Traits
//!
//! - [`channel::ChannelRx`] - read end, non-blocking availability check
//! - [`channel::ChannelTx`] - write end, blocking ordered writes
//! - [`channel::Channel`] - the connection that hands out both ends

#![no_std]
#![deny(unsafe_code)]

pub mod channel;

pub use channel::{Channel, ChannelEnd, ChannelRx, ChannelTx};
