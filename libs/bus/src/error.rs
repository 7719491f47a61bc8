//! Bus client errors
//!
//! Wraps the transport and framing taxonomies and adds the client-level
//! failure modes (connect, negotiation, broken-state misuse).

use std::path::PathBuf;

use thiserror::Error;
use types::{ErrCode, CONTROL_ID_BASE};

use codec::FrameError;
use transport::TransportError;

/// Result type alias for bus operations
pub type Result<T> = std::result::Result<T, BusError>;

/// Client and subscriber failures
#[derive(Error, Debug)]
pub enum BusError {
    /// Socket or path failure while connecting
    #[error("connect to {path:?} failed: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The broker answered the connect handshake with something other
    /// than a success reply
    #[error("connect negotiation rejected (reply id {msg_id:#x})")]
    Negotiation { msg_id: i32 },

    /// Operation on a broken client; repair first
    #[error("client is not connected (repair required)")]
    NotConnected,

    /// Application traffic may not use the reserved control-id range
    #[error("invalid message id {msg_id:#x}: application ids must be below {CONTROL_ID_BASE:#x}")]
    ReservedId { msg_id: i32 },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl BusError {
    /// Map to the flat signed code taxonomy.
    pub fn code(&self) -> ErrCode {
        match self {
            BusError::Connect { .. } => ErrCode::ConnectError,
            BusError::Negotiation { .. } => ErrCode::ConnectError,
            BusError::NotConnected => ErrCode::ConnectError,
            BusError::ReservedId { .. } => ErrCode::InvalidArg,
            BusError::Transport(inner) => inner.code(),
            BusError::Frame(inner) => inner.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_taxonomy() {
        assert_eq!(BusError::NotConnected.code(), ErrCode::ConnectError);
        assert_eq!(
            BusError::ReservedId { msg_id: 0xFF01 }.code(),
            ErrCode::InvalidArg
        );
        assert_eq!(
            BusError::Transport(TransportError::PeerClosed).code(),
            ErrCode::PeerClosed
        );
    }
}
