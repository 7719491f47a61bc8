//! Framing errors for wire codec and frame extraction
//!
//! Each variant carries the context needed to tell the two unrecoverable
//! buffer conditions apart: "need more bytes" is not an error at all (the
//! extractor returns `None`), "need more space" and "malformed stream"
//! are, and callers must treat them differently.

use thiserror::Error;
use types::ErrCode;

/// Result type for codec operations
pub type FrameResult<T> = std::result::Result<T, FrameError>;

/// Framing and encoding errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer capacity below one header is a configuration error
    #[error("framing buffer too small: capacity {capacity} is below one header ({header} bytes)")]
    CapacityTooSmall { capacity: usize, header: usize },

    /// A declared frame can never fit this buffer; distinct from
    /// "need more bytes" because no amount of reading recovers it
    #[error("out of space: frame needs {need} bytes, buffer capacity is {capacity}")]
    OutOfSpace { need: usize, capacity: usize },

    /// Token mismatch combined with an untrustworthy length field;
    /// the stream cannot be resynchronized and must be torn down
    #[error("malformed stream: {context} (declared {declared} bytes, capacity {capacity})")]
    Malformed {
        declared: usize,
        capacity: usize,
        context: &'static str,
    },

    /// Publish topics must have exactly one bit set
    #[error("invalid topic {topic:#x}: exactly one bit must be set")]
    InvalidTopic { topic: u64 },

    /// Payload exceeds what a 16-bit length field can describe
    #[error("payload too large: {size} bytes exceeds {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Notify carrier payload shorter than its envelope declares
    #[error("notify envelope truncated: need {need} bytes, got {got}")]
    TruncatedEnvelope { need: usize, got: usize },
}

impl FrameError {
    /// Create a malformed-stream error with diagnostic context.
    pub fn malformed(declared: usize, capacity: usize, context: &'static str) -> Self {
        Self::Malformed {
            declared,
            capacity,
            context,
        }
    }

    /// Map to the flat signed code taxonomy.
    pub fn code(&self) -> ErrCode {
        match self {
            FrameError::CapacityTooSmall { .. } => ErrCode::InvalidArg,
            FrameError::OutOfSpace { .. } => ErrCode::OutOfSpace,
            FrameError::Malformed { .. } => ErrCode::Malformed,
            FrameError::InvalidTopic { .. } => ErrCode::InvalidArg,
            FrameError::PayloadTooLarge { .. } => ErrCode::InvalidArg,
            FrameError::TruncatedEnvelope { .. } => ErrCode::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_taxonomy() {
        assert_eq!(
            FrameError::OutOfSpace {
                need: 100,
                capacity: 64
            }
            .code(),
            ErrCode::OutOfSpace
        );
        assert_eq!(
            FrameError::malformed(1 << 20, 64, "test").code(),
            ErrCode::Malformed
        );
        assert_eq!(
            FrameError::InvalidTopic { topic: 3 }.code(),
            ErrCode::InvalidArg
        );
    }
}
