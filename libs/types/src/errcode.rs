//! Stable signed error codes for transport and framing operations.
//!
//! Higher layers use structured error enums; these codes are the flat,
//! negative-integer surface the protocol contract promises (success is 0,
//! every failure is a distinct negative value).

/// Signed result codes for bus operations
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrCode {
    /// Operation completed
    Success = 0,
    /// Bounded wait expired before the operation completed
    Timeout = -1,
    /// Orderly remote shutdown (zero-length read)
    PeerClosed = -2,
    /// Framing buffer cannot hold a declared message
    OutOfSpace = -3,
    /// Socket-level receive failure (interruption is retried, not surfaced)
    RecvError = -4,
    /// Socket-level send failure
    SendError = -5,
    /// Socket, path or negotiation failure during connect
    ConnectError = -6,
    /// Token mismatch or structurally invalid header
    Malformed = -7,
    /// Caller misuse: bad path, undersized buffer, multi-bit topic
    InvalidArg = -8,
}

impl ErrCode {
    /// The raw signed code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// True for every code except [`ErrCode::Success`].
    pub fn is_error(self) -> bool {
        self != ErrCode::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_codes_are_negative() {
        for code in [
            ErrCode::Timeout,
            ErrCode::PeerClosed,
            ErrCode::OutOfSpace,
            ErrCode::RecvError,
            ErrCode::SendError,
            ErrCode::ConnectError,
            ErrCode::Malformed,
            ErrCode::InvalidArg,
        ] {
            assert!(code.as_i32() < 0);
            assert!(code.is_error());
        }
        assert_eq!(ErrCode::Success.as_i32(), 0);
        assert!(!ErrCode::Success.is_error());
    }
}
