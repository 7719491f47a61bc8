//! # msgbus Timed Transport
//!
//! ## Purpose
//!
//! Bounded socket I/O over Unix domain sockets: socket configuration
//! (blocking with fixed timeouts, or nonblocking, always close-on-exec),
//! a poll-based bounded readiness wait with transparent interruption
//! retry, and a message-level receive loop that feeds a
//! [`codec::FrameBuffer`] across partial reads.
//!
//! ## Architecture Role
//!
//! ```text
//! codec → [transport] → client / subscriber
//!   ↓          ↓
//! Framing   Socket I/O, deadlines
//! ```
//!
//! Every operation here is synchronous and bounded by the caller's
//! timeout; the worst outcome is an error value, never a hang beyond the
//! deadline or a panic.

pub mod error;
pub mod frames;
pub mod socket;

pub use error::{Result, TransportError};
pub use frames::{recv_frame, send_frame};
pub use socket::{configure, read_once, recv_bounded, wait_readable, Readiness};
