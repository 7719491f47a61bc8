//! # msgbus Client Library
//!
//! ## Purpose
//!
//! Request/response and publish/subscribe for cooperating daemons on one
//! host, over Unix domain sockets to a local broker. This crate holds the
//! client-side protocol state machine: connect negotiation, synchronous
//! timeout-bounded requests, fire-and-forget publishes, subscription
//! registration with a dedicated dispatch thread, and explicit
//! reconnect-repair after failures.
//!
//! ## Architecture Role
//!
//! ```text
//! facade → client / subscriber → transport → codec → types
//!   ↓            ↓                   ↓          ↓
//! One-shot   Conn state,        Bounded    Framing,
//! calls      dispatch loop      socket I/O token check
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use bus::{BusConfig, Notify};
//!
//! let config = BusConfig::default();
//!
//! // one-shot request: reply is clamped to the output buffer
//! let mut reply = [0u8; 128];
//! let n = bus::request(&config, "broker", 5, b"ping", &mut reply, None)?;
//! println!("reply: {:?}", &reply[..n]);
//!
//! // subscription with a closure handler
//! let sub = bus::register(&config, "broker", 0b1010, None, |msg_id: i32, payload: &[u8]| {
//!     println!("notify {msg_id}: {} bytes", payload.len());
//!     0
//! })?;
//! bus::unregister(sub)?;
//! # Ok::<(), bus::BusError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod facade;
pub mod process;
pub mod subscriber;

pub use client::Client;
pub use config::BusConfig;
pub use error::{BusError, Result};
pub use facade::{publish, register, request, unregister};
pub use process::process_name;
pub use subscriber::{Notify, Subscription};

// Re-export the wire-level surface callers commonly need
pub use types::{
    topic_check, ControlId, ErrCode, Message, MsgFlags, SEND_TO_ALL, SEND_TO_SUBSCRIBED,
};
