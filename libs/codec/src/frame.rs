//! Stream de-framer: fixed-capacity arena with head/tail cursors
//!
//! ## Purpose
//!
//! Bytes arrive from a socket in arbitrary chunks; [`FrameBuffer`] turns the
//! accumulated run into discrete, token-validated messages. It recovers from
//! partial reads, skips foreign frames by their declared length, compacts
//! itself when full and keeps returned frames alignment-safe. This is the
//! piece where framing bugs and stream desynchronization happen, so every
//! state transition here is cursor arithmetic over one backing block.
//!
//! ## Invariants
//!
//! - `0 <= head <= tail <= capacity`
//! - `[head, tail)` holds unconsumed input; bytes below `head` are free but
//!   only reclaimed by an explicit compaction
//! - compaction runs only when the buffer is full and never reorders
//!   unconsumed bytes

use tracing::{debug, warn};
use types::{Message, MessageHeader, MsgFlags};
use zerocopy::FromBytes;

use crate::error::{FrameError, FrameResult};
use crate::wire;

/// A decoded frame borrowed from a [`FrameBuffer`]
///
/// `msg_id` has the validation token already stripped. The payload borrow
/// pins the buffer until the caller is done with it.
#[derive(Debug, PartialEq, Eq)]
pub struct Frame<'a> {
    pub from: i32,
    pub msg_id: i32,
    pub flags: MsgFlags,
    pub data: &'a [u8],
}

impl Frame<'_> {
    /// Copy out into an owned message.
    pub fn to_message(&self) -> Message {
        Message::new(self.from, self.msg_id, self.flags, self.data.to_vec())
    }
}

/// Fixed-capacity framing buffer with explicit head/tail cursors
pub struct FrameBuffer {
    data: Box<[u8]>,
    head: usize,
    tail: usize,
    /// Private copy target for sticky frames (frames followed by more
    /// unconsumed bytes, which compaction could move underneath a caller)
    scratch: Vec<u8>,
}

impl FrameBuffer {
    /// Allocate a buffer. Capacities below one header size cannot ever
    /// hold a message and are rejected outright.
    pub fn with_capacity(capacity: usize) -> FrameResult<Self> {
        if capacity < MessageHeader::SIZE {
            return Err(FrameError::CapacityTooSmall {
                capacity,
                header: MessageHeader::SIZE,
            });
        }
        Ok(Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            scratch: Vec::new(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Unconsumed byte count.
    pub fn len(&self) -> usize {
        self.tail - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// No room left for further reads until frames are consumed.
    pub fn is_full(&self) -> bool {
        self.tail == self.data.len()
    }

    /// Read cursor, exposed for diagnostics and tests.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Write cursor, exposed for diagnostics and tests.
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Writable tail region for the next socket read.
    pub fn writable(&mut self) -> &mut [u8] {
        let tail = self.tail;
        &mut self.data[tail..]
    }

    /// Account for `n` bytes appended to the writable region.
    pub fn commit(&mut self, n: usize) {
        debug_assert!(self.tail + n <= self.data.len());
        self.tail += n;
    }

    /// Copy as much of `src` as fits and commit it. Returns bytes taken.
    pub fn fill(&mut self, src: &[u8]) -> usize {
        let room = self.writable();
        let n = src.len().min(room.len());
        room[..n].copy_from_slice(&src[..n]);
        self.commit(n);
        n
    }

    /// Drop all buffered bytes.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
    }

    /// Extract the next complete, token-valid frame.
    ///
    /// `Ok(None)` means "need more bytes". Foreign frames (token mismatch)
    /// are skipped by their declared length without aborting the stream;
    /// a foreign frame whose declared length cannot fit the buffer at all
    /// is a fatal [`FrameError::Malformed`], since its length field cannot
    /// be trusted to resynchronize on.
    pub fn next_frame(&mut self) -> FrameResult<Option<Frame<'_>>> {
        loop {
            let avail = self.tail - self.head;
            if avail < MessageHeader::SIZE {
                self.reclaim();
                return Ok(None);
            }

            // Header peek copies 12 bytes: `head` carries no alignment
            // guarantee at this point.
            let header =
                MessageHeader::read_from(&self.data[self.head..self.head + MessageHeader::SIZE])
                    .ok_or(FrameError::malformed(
                        MessageHeader::SIZE,
                        self.data.len(),
                        "header peek failed",
                    ))?;
            let total = header.wire_len();
            let friendly = wire::open_id(header.msg_id);

            if total > self.data.len() {
                return match friendly {
                    // A real frame that can never complete at this capacity.
                    Some(_) => Err(FrameError::OutOfSpace {
                        need: total,
                        capacity: self.data.len(),
                    }),
                    // Token mismatch and an out-of-range length: skipping
                    // on this length could scan past valid data.
                    None => Err(FrameError::malformed(
                        total,
                        self.data.len(),
                        "token mismatch with out-of-range length",
                    )),
                };
            }
            if avail < total {
                self.reclaim();
                return Ok(None);
            }

            let start = self.head;
            self.head += total;

            let msg_id = match friendly {
                Some(id) => id,
                None => {
                    warn!(
                        declared = total,
                        offset = start,
                        "skipping foreign frame (token mismatch)"
                    );
                    continue;
                }
            };

            let body = start + MessageHeader::SIZE;
            if self.head < self.tail {
                // Sticky: bytes follow this frame, so the arena may be
                // compacted before the caller finishes with it.
                self.scratch.clear();
                self.scratch.extend_from_slice(&self.data[body..start + total]);
                return Ok(Some(Frame {
                    from: header.from,
                    msg_id,
                    flags: header.flags(),
                    data: &self.scratch,
                }));
            }
            if start % MessageHeader::ALIGN != 0 {
                // Alignment repair: relocate the trailing frame to offset 0.
                debug!(offset = start, total, "relocating misaligned frame");
                self.data.copy_within(start..start + total, 0);
                self.head = total;
                self.tail = total;
                return Ok(Some(Frame {
                    from: header.from,
                    msg_id,
                    flags: header.flags(),
                    data: &self.data[MessageHeader::SIZE..total],
                }));
            }
            return Ok(Some(Frame {
                from: header.from,
                msg_id,
                flags: header.flags(),
                data: &self.data[body..start + total],
            }));
        }
    }

    /// Reclaim consumed space. Resets the cursors when drained; compacts a
    /// partial frame down to offset 0 only when the buffer is full, so a
    /// future read can still grow it to completion.
    fn reclaim(&mut self) {
        if self.head == self.tail {
            self.head = 0;
            self.tail = 0;
        } else if self.is_full() && self.head > 0 {
            debug!(head = self.head, partial = self.len(), "compacting framing buffer");
            self.data.copy_within(self.head..self.tail, 0);
            self.tail -= self.head;
            self.head = 0;
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("capacity", &self.data.len())
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{encode, seal_id};
    use types::WIRE_TOKEN;
    use zerocopy::AsBytes;

    fn msg(id: i32, payload: &[u8]) -> Message {
        Message::new(1, id, MsgFlags::empty(), payload.to_vec())
    }

    fn foreign_frame(data_len: u16) -> Vec<u8> {
        // structurally fine, wrong token
        let header = MessageHeader {
            from: 9,
            msg_id: 0x1234_0007,
            flags: 0,
            data_len,
        };
        let mut wire = header.as_bytes().to_vec();
        wire.extend(std::iter::repeat(0xAA).take(data_len as usize));
        wire
    }

    #[test]
    fn test_rejects_undersized_capacity() {
        assert!(matches!(
            FrameBuffer::with_capacity(MessageHeader::SIZE - 1),
            Err(FrameError::CapacityTooSmall { .. })
        ));
        assert!(FrameBuffer::with_capacity(MessageHeader::SIZE).is_ok());
    }

    #[test]
    fn test_single_frame_round_trip() {
        let mut fb = FrameBuffer::with_capacity(256).unwrap();
        let original = msg(5, b"ping");
        fb.fill(&encode(&original).unwrap());

        let frame = fb.next_frame().unwrap().expect("complete frame");
        assert_eq!(frame.msg_id, 5);
        assert_eq!(frame.data, b"ping");
        assert_eq!(frame.to_message(), original);

        assert!(fb.next_frame().unwrap().is_none());
        assert!(fb.is_empty());
    }

    #[test]
    fn test_incomplete_header_then_completion() {
        let mut fb = FrameBuffer::with_capacity(256).unwrap();
        let wire = encode(&msg(7, b"partial")).unwrap();

        fb.fill(&wire[..MessageHeader::SIZE - 3]);
        assert!(fb.next_frame().unwrap().is_none());

        fb.fill(&wire[MessageHeader::SIZE - 3..MessageHeader::SIZE + 2]);
        assert!(fb.next_frame().unwrap().is_none());

        fb.fill(&wire[MessageHeader::SIZE + 2..]);
        let frame = fb.next_frame().unwrap().expect("completed frame");
        assert_eq!(frame.msg_id, 7);
        assert_eq!(frame.data, b"partial");
    }

    #[test]
    fn test_back_to_back_frames_in_order() {
        let mut fb = FrameBuffer::with_capacity(1024).unwrap();
        let originals: Vec<Message> = (0..5).map(|i| msg(i, format!("m{i}").as_bytes())).collect();
        for m in &originals {
            fb.fill(&encode(m).unwrap());
        }
        for expected in &originals {
            let got = fb.next_frame().unwrap().expect("frame").to_message();
            assert_eq!(&got, expected);
        }
        assert!(fb.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_foreign_frame_skipped_by_declared_length() {
        let mut fb = FrameBuffer::with_capacity(256).unwrap();
        fb.fill(&foreign_frame(8));
        let good = msg(3, b"ok");
        fb.fill(&encode(&good).unwrap());

        let frame = fb.next_frame().unwrap().expect("frame after skip");
        assert_eq!(frame.msg_id, 3);
        assert_eq!(frame.data, b"ok");
    }

    #[test]
    fn test_foreign_frame_with_oversized_length_is_fatal() {
        let mut fb = FrameBuffer::with_capacity(64).unwrap();
        fb.fill(&foreign_frame(500)[..20]);
        assert!(matches!(
            fb.next_frame(),
            Err(FrameError::Malformed { declared: 512, .. })
        ));
    }

    #[test]
    fn test_valid_frame_larger_than_capacity_is_out_of_space() {
        let mut fb = FrameBuffer::with_capacity(64).unwrap();
        let header = MessageHeader {
            from: 1,
            msg_id: seal_id(5),
            flags: 0,
            data_len: 100,
        };
        fb.fill(header.as_bytes());
        assert!(matches!(
            fb.next_frame(),
            Err(FrameError::OutOfSpace { need: 112, capacity: 64 })
        ));
    }

    #[test]
    fn test_compaction_when_full_with_partial_tail() {
        // capacity 64, header 12: one complete 32-byte message, then the
        // first 32 bytes of a 52-byte message fill the buffer exactly.
        let mut fb = FrameBuffer::with_capacity(64).unwrap();
        let first = msg(1, &[0x11; 20]);
        let second = msg(2, &[0x22; 40]);
        let second_wire = encode(&second).unwrap();
        assert_eq!(second_wire.len(), 52);

        fb.fill(&encode(&first).unwrap());
        fb.fill(&second_wire[..32]);
        assert!(fb.is_full());

        let frame = fb.next_frame().unwrap().expect("first message");
        assert_eq!(frame.msg_id, 1);
        assert_eq!(fb.head(), 32);

        // incomplete second message while full triggers compaction
        assert!(fb.next_frame().unwrap().is_none());
        assert_eq!(fb.head(), 0);
        assert_eq!(fb.tail(), 32);

        fb.fill(&second_wire[32..]);
        let frame = fb.next_frame().unwrap().expect("second message");
        assert_eq!(frame.msg_id, 2);
        assert_eq!(frame.data, &[0x22; 40][..]);
    }

    #[test]
    fn test_trailing_frame_relocated_to_aligned_offset() {
        let mut fb = FrameBuffer::with_capacity(256).unwrap();
        // 13-byte foreign frame leaves head at a non-multiple of the
        // header alignment once skipped
        fb.fill(&foreign_frame(1));
        let wire = encode(&msg(4, b"abc")).unwrap();
        fb.fill(&wire);

        let frame = fb.next_frame().unwrap().expect("frame");
        assert_eq!(frame.msg_id, 4);
        assert_eq!(frame.data, b"abc");
        drop(frame);
        // relocation moved the frame to offset 0 and consumed it fully
        assert_eq!(fb.head(), wire.len());
        assert_eq!(fb.tail(), wire.len());
        assert_eq!(fb.head() % MessageHeader::ALIGN, 0);
    }

    #[test]
    fn test_sticky_frame_survives_buffer_reuse() {
        let mut fb = FrameBuffer::with_capacity(256).unwrap();
        fb.fill(&encode(&msg(1, b"first")).unwrap());
        fb.fill(&encode(&msg(2, b"second")).unwrap());

        // first extraction is sticky (bytes remain behind it)
        let copied = fb.next_frame().unwrap().expect("frame").to_message();
        assert_eq!(copied.data, b"first");
        let second = fb.next_frame().unwrap().expect("frame").to_message();
        assert_eq!(second.data, b"second");
    }

    #[test]
    fn test_garbage_only_stream_consumes_to_empty() {
        let mut fb = FrameBuffer::with_capacity(256).unwrap();
        fb.fill(&foreign_frame(4));
        fb.fill(&foreign_frame(0));
        assert!(fb.next_frame().unwrap().is_none());
        assert!(fb.is_empty());
    }

    #[test]
    fn test_token_constant_is_in_high_bits() {
        let sealed = seal_id(5) as u32;
        assert_eq!((sealed >> 16) as u16, WIRE_TOKEN);
        assert_eq!(sealed & 0xFFFF, 5);
    }
}
