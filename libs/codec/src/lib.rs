//! # msgbus Codec
//!
//! ## Purpose
//!
//! The "rules" layer of the bus: how a [`types::Message`] becomes bytes on
//! a stream and how discrete messages are recovered from a stream delivered
//! in arbitrary chunks. This is where the validation token is merged and
//! checked, where foreign frames are skipped, and where partial-read
//! recovery, buffer compaction and alignment repair live.
//!
//! ## Architecture Role
//!
//! ```text
//! types → [codec] → transport → client / subscriber
//!   ↑        ↓          ↓
//! Pure    Encoding   Socket I/O
//! Data    Framing    Bounded waits
//! ```
//!
//! ## What This Crate Contains
//! - [`wire`]: token seal/strip, single-copy message encoding, notify
//!   envelope construction and unpacking
//! - [`frame`]: [`FrameBuffer`], the fixed-capacity de-framer
//! - [`error`]: the framing error taxonomy
//!
//! ## What This Crate Does NOT Contain
//! - Socket management or timeouts (belongs in `transport`)
//! - Connection state or pub/sub logic (belongs in `bus`)

pub mod error;
pub mod frame;
pub mod wire;

pub use error::{FrameError, FrameResult};
pub use frame::{Frame, FrameBuffer};
pub use wire::{
    build_notify, encode, encode_into, open_id, seal_id, unpack_notify,
};
