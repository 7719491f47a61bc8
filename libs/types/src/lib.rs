//! # msgbus Wire Types
//!
//! ## Purpose
//!
//! Pure data definitions for the msgbus framed IPC protocol: the fixed
//! message header, the notify envelope carried by pub/sub traffic, the
//! protocol control-id space, flag bits, addressing sentinels and the
//! signed error-code taxonomy shared by every layer above.
//!
//! ## What This Crate Contains
//! - `MessageHeader`: the 12-byte on-wire header (zero-copy friendly)
//! - `Message`: an owned header + payload pair
//! - `NotifyHeader`: the pub/sub envelope embedded in notify payloads
//! - `ControlId`: reserved protocol message ids (connect/register/...)
//! - `MsgFlags`: typed flag bitset
//! - `ErrCode`: stable signed codes surfaced at FFI-ish boundaries
//!
//! ## What This Crate Does NOT Contain
//! - Encoding/decoding rules and framing (belongs in `codec`)
//! - Socket management (belongs in `transport`)

pub mod constants;
pub mod errcode;
pub mod message;
pub mod notify;

pub use constants::{
    ControlId, CONTROL_ID_BASE, DEFAULT_SOCKET_DIR, WIRE_TOKEN,
};
pub use errcode::ErrCode;
pub use message::{Message, MessageHeader, MsgFlags};
pub use notify::{topic_check, NotifyHeader, SEND_TO_ALL, SEND_TO_SUBSCRIBED};
