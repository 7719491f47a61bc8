//! Wire encoding: validation token handling and notify envelopes
//!
//! Encoding ORs the fixed 16-bit token into the high bits of `msg_id` and
//! writes header plus payload as one contiguous copy. Decoding requires an
//! exact token match before anything else in a frame is trusted.

use types::{
    topic_check, ControlId, Message, MessageHeader, MsgFlags, NotifyHeader, WIRE_TOKEN,
};
use zerocopy::AsBytes;

use crate::error::{FrameError, FrameResult};

/// Merge the validation token into an application message id.
///
/// The low 16 bits keep the id; the high 16 bits become [`WIRE_TOKEN`].
pub fn seal_id(msg_id: i32) -> i32 {
    (((WIRE_TOKEN as u32) << 16) | (msg_id as u32 & 0xFFFF)) as i32
}

/// Check the token on a wire id and strip it.
///
/// Returns the application id for a friendly frame, `None` for a foreign
/// or corrupt one.
pub fn open_id(wire_id: i32) -> Option<i32> {
    let raw = wire_id as u32;
    if (raw >> 16) as u16 == WIRE_TOKEN {
        Some((raw & 0xFFFF) as i32)
    } else {
        None
    }
}

/// Encode a message into `buf` as header + payload in a single pass.
///
/// Returns the number of bytes written. The caller's buffer must hold the
/// whole frame; a short buffer is an out-of-space condition, not a partial
/// write.
pub fn encode_into(msg: &Message, buf: &mut [u8]) -> FrameResult<usize> {
    if msg.data.len() > u16::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: msg.data.len(),
            max: u16::MAX as usize,
        });
    }
    let total = msg.wire_len();
    if buf.len() < total {
        return Err(FrameError::OutOfSpace {
            need: total,
            capacity: buf.len(),
        });
    }

    let header = MessageHeader {
        from: msg.from,
        msg_id: seal_id(msg.msg_id),
        flags: msg.flags.bits(),
        data_len: msg.data.len() as u16,
    };
    buf[..MessageHeader::SIZE].copy_from_slice(header.as_bytes());
    buf[MessageHeader::SIZE..total].copy_from_slice(&msg.data);
    Ok(total)
}

/// Encode a message into a freshly allocated wire buffer.
pub fn encode(msg: &Message) -> FrameResult<Vec<u8>> {
    let mut buf = vec![0u8; msg.wire_len()];
    let written = encode_into(msg, &mut buf)?;
    buf.truncate(written);
    Ok(buf)
}

/// Build a notify carrier message around a pub/sub payload.
///
/// Packs `to`, `topic`, `msg_id` and the payload into the carrier's data
/// region and stamps the carrier with the reserved notify id. The topic
/// must have exactly one bit set.
pub fn build_notify(
    from: i32,
    to: i32,
    topic: u64,
    msg_id: i32,
    payload: &[u8],
) -> FrameResult<Message> {
    if !topic_check(topic) {
        return Err(FrameError::InvalidTopic { topic });
    }
    let total = NotifyHeader::SIZE + payload.len();
    if total > u16::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: total,
            max: u16::MAX as usize,
        });
    }

    let envelope = NotifyHeader {
        to,
        topic,
        msg_id,
        data_len: payload.len() as i32,
    };
    let mut data = vec![0u8; total];
    envelope.write_to(&mut data);
    data[NotifyHeader::SIZE..].copy_from_slice(payload);

    Ok(Message::new(
        from,
        ControlId::Notify as i32,
        MsgFlags::empty(),
        data,
    ))
}

/// Unpack a notify envelope from a carrier message's data region.
///
/// Returns the envelope header and a view of the notification payload.
pub fn unpack_notify(data: &[u8]) -> FrameResult<(NotifyHeader, &[u8])> {
    let envelope = NotifyHeader::read_from(data).ok_or(FrameError::TruncatedEnvelope {
        need: NotifyHeader::SIZE,
        got: data.len(),
    })?;
    if envelope.data_len < 0 {
        return Err(FrameError::TruncatedEnvelope {
            need: NotifyHeader::SIZE,
            got: data.len(),
        });
    }
    let len = envelope.data_len as usize;
    let need = NotifyHeader::SIZE + len;
    if data.len() < need {
        return Err(FrameError::TruncatedEnvelope {
            need,
            got: data.len(),
        });
    }
    Ok((envelope, &data[NotifyHeader::SIZE..need]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::SEND_TO_ALL;
    use zerocopy::FromBytes;

    #[test]
    fn test_seal_open_round_trip() {
        for id in [0, 1, 5, 0xFEFF, ControlId::Notify as i32] {
            let sealed = seal_id(id);
            assert_eq!(open_id(sealed), Some(id));
        }
    }

    #[test]
    fn test_open_rejects_foreign_token() {
        assert_eq!(open_id(5), None);
        assert_eq!(open_id(0x1234_0005), None);
        assert_eq!(open_id(-1), None);
    }

    #[test]
    fn test_encode_layout() {
        let msg = Message::new(7, 5, MsgFlags::REPLY, b"ping".to_vec());
        let wire = encode(&msg).unwrap();
        assert_eq!(wire.len(), MessageHeader::SIZE + 4);

        let header = MessageHeader::read_from(&wire[..MessageHeader::SIZE]).unwrap();
        assert_eq!(header.from, 7);
        assert_eq!(open_id(header.msg_id), Some(5));
        assert_eq!(header.flags, MsgFlags::REPLY.bits());
        assert_eq!(header.data_len, 4);
        assert_eq!(&wire[MessageHeader::SIZE..], b"ping");
    }

    #[test]
    fn test_encode_into_short_buffer() {
        let msg = Message::new(1, 2, MsgFlags::empty(), vec![0u8; 32]);
        let mut buf = [0u8; 16];
        assert!(matches!(
            encode_into(&msg, &mut buf),
            Err(FrameError::OutOfSpace { need: 44, .. })
        ));
    }

    #[test]
    fn test_build_notify_layout() {
        let msg = build_notify(3, SEND_TO_ALL, 1 << 4, 99, b"hello").unwrap();
        assert_eq!(msg.msg_id, ControlId::Notify as i32);
        assert_eq!(msg.data.len(), NotifyHeader::SIZE + 5);

        let (envelope, payload) = unpack_notify(&msg.data).unwrap();
        assert_eq!(envelope.to, SEND_TO_ALL);
        assert_eq!(envelope.topic, 1 << 4);
        assert_eq!(envelope.msg_id, 99);
        assert_eq!(envelope.data_len, 5);
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn test_build_notify_rejects_bad_topic() {
        for topic in [0u64, 3, 6] {
            assert!(matches!(
                build_notify(1, SEND_TO_ALL, topic, 1, &[]),
                Err(FrameError::InvalidTopic { .. })
            ));
        }
    }

    #[test]
    fn test_unpack_notify_truncated() {
        let msg = build_notify(3, 9, 1, 7, b"abcdef").unwrap();
        // envelope header cut short
        assert!(unpack_notify(&msg.data[..10]).is_err());
        // envelope intact but payload short of data_len
        assert!(unpack_notify(&msg.data[..msg.data.len() - 2]).is_err());
    }
}
