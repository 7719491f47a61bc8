//! Notify envelope: the pub/sub payload carried inside a Notify message.
//!
//! The envelope travels at an arbitrary offset inside another message's
//! payload, so its `u64` topic field has no alignment guarantee. It is
//! packed and unpacked with explicit byte serialization rather than a
//! zero-copy view.

/// Broadcast destination: every connected client.
pub const SEND_TO_ALL: i32 = -1;

/// Broadcast destination: every client registered for the topic.
pub const SEND_TO_SUBSCRIBED: i32 = -2;

/// Notify envelope header (20 bytes packed), followed by `data_len`
/// payload bytes inside the carrier message's data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyHeader {
    /// Destination identity, or [`SEND_TO_ALL`] / [`SEND_TO_SUBSCRIBED`]
    pub to: i32,
    /// Topic bitmask; exactly one bit set
    pub topic: u64,
    /// Application message id delivered to the subscriber handler
    pub msg_id: i32,
    /// Byte length of the notification payload
    pub data_len: i32,
}

impl NotifyHeader {
    /// Packed envelope header size in bytes
    pub const SIZE: usize = 20;

    /// Serialize into `buf`, which must hold at least [`Self::SIZE`] bytes.
    pub fn write_to(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.to.to_ne_bytes());
        buf[4..12].copy_from_slice(&self.topic.to_ne_bytes());
        buf[12..16].copy_from_slice(&self.msg_id.to_ne_bytes());
        buf[16..20].copy_from_slice(&self.data_len.to_ne_bytes());
    }

    /// Deserialize from `buf`; `None` if fewer than [`Self::SIZE`] bytes.
    pub fn read_from(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            to: i32::from_ne_bytes(buf[0..4].try_into().ok()?),
            topic: u64::from_ne_bytes(buf[4..12].try_into().ok()?),
            msg_id: i32::from_ne_bytes(buf[12..16].try_into().ok()?),
            data_len: i32::from_ne_bytes(buf[16..20].try_into().ok()?),
        })
    }
}

/// Validate a publish topic: exactly one bit set.
///
/// A subscriber's registration mask is a union of topics and is not
/// subject to this check; it applies to the topic of a single publish.
pub fn topic_check(topic: u64) -> bool {
    topic.is_power_of_two()
}
