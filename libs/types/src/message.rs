//! Message Header Implementation
//!
//! The header is identical for all messages and carries addressing,
//! validation and length information for the trailing payload.

use std::ops::{BitOr, BitOrAssign};

use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// Message Header (12 bytes)
///
/// **CRITICAL**: Field ordering is chosen to achieve exactly 12 bytes with
/// zero padding (two 4-byte fields, then two 2-byte fields). DO NOT REORDER
/// without understanding the padding implications.
///
/// ```text
/// ┌─────────────────┬─────────────────────────────────────┐
/// │ MessageHeader   │ Payload                             │
/// │ (12 bytes)      │ (data_len bytes)                    │
/// └─────────────────┴─────────────────────────────────────┘
/// ```
///
/// On the wire the high 16 bits of `msg_id` hold the validation token;
/// the codec strips them before a message reaches application code.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct MessageHeader {
    /// Sender identity assigned during connect negotiation (bytes 0-3)
    pub from: i32,
    /// Message id; token in the high 16 bits on the wire (bytes 4-7)
    pub msg_id: i32,
    /// Flag bits, see [`MsgFlags`] (bytes 8-9)
    pub flags: u16,
    /// Byte length of the trailing payload (bytes 10-11)
    pub data_len: u16,
}
// Total: EXACTLY 12 bytes with zero padding.

impl MessageHeader {
    /// Header size in bytes
    pub const SIZE: usize = 12;

    /// Required start alignment for in-place header access
    pub const ALIGN: usize = std::mem::align_of::<MessageHeader>();

    /// Total wire length of the frame this header describes.
    pub fn wire_len(&self) -> usize {
        Self::SIZE + self.data_len as usize
    }

    /// Typed view of the flag bits.
    pub fn flags(&self) -> MsgFlags {
        MsgFlags(self.flags)
    }
}

/// Typed flag bitset for [`MessageHeader::flags`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MsgFlags(pub u16);

impl MsgFlags {
    /// Bit 0: this message expects a reply, or is one.
    pub const REPLY: MsgFlags = MsgFlags(1 << 0);

    /// No bits set.
    pub fn empty() -> Self {
        MsgFlags(0)
    }

    /// Raw bit pattern.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// True if every bit of `other` is set in `self`.
    pub fn contains(self, other: MsgFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MsgFlags {
    type Output = MsgFlags;

    fn bitor(self, rhs: MsgFlags) -> MsgFlags {
        MsgFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for MsgFlags {
    fn bitor_assign(&mut self, rhs: MsgFlags) {
        self.0 |= rhs.0;
    }
}

/// An owned message: header fields plus payload bytes
///
/// `msg_id` here is always the application-visible id; the validation
/// token only exists inside encoded wire buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: i32,
    pub msg_id: i32,
    pub flags: MsgFlags,
    pub data: Vec<u8>,
}

impl Message {
    pub fn new(from: i32, msg_id: i32, flags: MsgFlags, data: impl Into<Vec<u8>>) -> Self {
        Self {
            from,
            msg_id,
            flags,
            data: data.into(),
        }
    }

    /// Total encoded length of this message.
    pub fn wire_len(&self) -> usize {
        MessageHeader::SIZE + self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(std::mem::size_of::<MessageHeader>(), MessageHeader::SIZE);
        assert_eq!(MessageHeader::SIZE, 12);
    }

    #[test]
    fn test_wire_len() {
        let header = MessageHeader {
            from: 7,
            msg_id: 5,
            flags: 0,
            data_len: 100,
        };
        assert_eq!(header.wire_len(), 112);
    }

    #[test]
    fn test_flags() {
        let mut flags = MsgFlags::empty();
        assert!(!flags.contains(MsgFlags::REPLY));
        flags |= MsgFlags::REPLY;
        assert!(flags.contains(MsgFlags::REPLY));
        assert_eq!(flags.bits(), 1);
    }

    #[test]
    fn test_header_byte_view() {
        let header = MessageHeader {
            from: 1,
            msg_id: 2,
            flags: 3,
            data_len: 4,
        };
        let bytes = header.as_bytes();
        assert_eq!(bytes.len(), MessageHeader::SIZE);
        let back = MessageHeader::read_from(bytes).unwrap();
        assert_eq!(back, header);
    }
}
