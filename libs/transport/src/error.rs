//! Transport Error Types
//!
//! Error taxonomy for bounded socket I/O. Interruption (`EINTR`) is retried
//! inside the transport and never appears here.

use thiserror::Error;
use types::ErrCode;

use codec::FrameError;

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Transport-level failures
#[derive(Error, Debug)]
pub enum TransportError {
    /// Bounded wait expired before the operation completed
    #[error("timeout: {operation} exceeded {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// Orderly remote shutdown (zero-length read)
    #[error("peer closed the connection")]
    PeerClosed,

    /// Socket-level receive failure
    #[error("receive failed: {source}")]
    Recv {
        #[source]
        source: std::io::Error,
    },

    /// Socket-level send failure
    #[error("send failed: {source}")]
    Send {
        #[source]
        source: std::io::Error,
    },

    /// No timeout configured and the frame did not complete in one read
    #[error("incomplete frame and no wait configured")]
    Incomplete,

    /// Framing buffer filled up before a complete frame was recognized
    #[error("framing buffer full ({capacity} bytes) without a complete frame")]
    NoSpace { capacity: usize },

    /// Socket option / flag setup failure
    #[error("socket configuration failed: {source}")]
    Configure {
        #[source]
        source: std::io::Error,
    },

    /// Framing failure on the receive path
    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl TransportError {
    /// Create a timeout error for a named operation.
    pub fn timeout(operation: &'static str, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation,
            timeout_ms,
        }
    }

    /// Map to the flat signed code taxonomy.
    pub fn code(&self) -> ErrCode {
        match self {
            TransportError::Timeout { .. } => ErrCode::Timeout,
            TransportError::PeerClosed => ErrCode::PeerClosed,
            TransportError::Recv { .. } => ErrCode::RecvError,
            TransportError::Send { .. } => ErrCode::SendError,
            // would-block semantics: the caller declined to wait
            TransportError::Incomplete => ErrCode::Timeout,
            TransportError::NoSpace { .. } => ErrCode::OutOfSpace,
            TransportError::Configure { .. } => ErrCode::ConnectError,
            TransportError::Frame(inner) => inner.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_taxonomy() {
        assert_eq!(
            TransportError::timeout("recv", 100).code(),
            ErrCode::Timeout
        );
        assert_eq!(TransportError::PeerClosed.code(), ErrCode::PeerClosed);
        assert_eq!(
            TransportError::Frame(FrameError::OutOfSpace {
                need: 100,
                capacity: 64
            })
            .code(),
            ErrCode::OutOfSpace
        );
    }
}
