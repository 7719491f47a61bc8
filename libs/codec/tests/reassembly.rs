//! Stream reassembly integration tests
//!
//! Feeds encoded message runs through the framing buffer under arbitrary
//! chunk boundaries and checks that the original messages come back out,
//! in order and byte-identical.

use codec::{encode, FrameBuffer};
use proptest::prelude::*;
use types::{Message, MsgFlags};

fn sample_messages() -> Vec<Message> {
    vec![
        Message::new(1, 5, MsgFlags::REPLY, b"ping".to_vec()),
        Message::new(2, 0, MsgFlags::empty(), Vec::new()),
        Message::new(3, 0xFE00, MsgFlags::empty(), vec![0xAB; 37]),
        Message::new(-1, 17, MsgFlags::REPLY, b"x".to_vec()),
    ]
}

fn drain(fb: &mut FrameBuffer, out: &mut Vec<Message>) {
    while let Some(frame) = fb.next_frame().expect("stream stays well-formed") {
        out.push(frame.to_message());
    }
}

/// Deliver `stream` in two chunks split at `split`, collecting every
/// decoded message.
fn feed_split(stream: &[u8], split: usize) -> Vec<Message> {
    let mut fb = FrameBuffer::with_capacity(stream.len().max(16)).unwrap();
    let mut out = Vec::new();
    assert_eq!(fb.fill(&stream[..split]), split);
    drain(&mut fb, &mut out);
    assert_eq!(fb.fill(&stream[split..]), stream.len() - split);
    drain(&mut fb, &mut out);
    out
}

#[test]
fn split_at_every_byte_offset() {
    let originals = sample_messages();
    let mut stream = Vec::new();
    for m in &originals {
        stream.extend(encode(m).unwrap());
    }

    for split in 0..=stream.len() {
        let decoded = feed_split(&stream, split);
        assert_eq!(decoded, originals, "split at {split} desynchronized the stream");
    }
}

#[test]
fn single_frame_split_mid_payload() {
    let original = Message::new(7, 5, MsgFlags::REPLY, b"split-me".to_vec());
    let wire = encode(&original).unwrap();
    let mut fb = FrameBuffer::with_capacity(64).unwrap();

    // first chunk ends partway through the payload
    fb.fill(&wire[..wire.len() - 3]);
    assert!(fb.next_frame().unwrap().is_none());

    fb.fill(&wire[wire.len() - 3..]);
    let frame = fb.next_frame().unwrap().expect("frame completes");
    assert_eq!(frame.to_message(), original);
}

proptest! {
    /// Any chunking of any message run reassembles to the original run.
    #[test]
    fn chunked_delivery_reassembles(
        payload_lens in prop::collection::vec(0usize..200, 1..8),
        chunk_lens in prop::collection::vec(1usize..64, 1..64),
    ) {
        let originals: Vec<Message> = payload_lens
            .iter()
            .enumerate()
            .map(|(i, &len)| {
                Message::new(i as i32, (i % 0xFF00) as i32, MsgFlags::empty(), vec![i as u8; len])
            })
            .collect();
        let mut stream = Vec::new();
        for m in &originals {
            stream.extend(encode(m).unwrap());
        }

        let mut fb = FrameBuffer::with_capacity(stream.len().max(16)).unwrap();
        let mut decoded = Vec::new();
        let mut offset = 0;
        let mut chunks = chunk_lens.iter().cycle();
        while offset < stream.len() {
            let take = (*chunks.next().unwrap()).min(stream.len() - offset);
            fb.fill(&stream[offset..offset + take]);
            offset += take;
            drain(&mut fb, &mut decoded);
        }

        prop_assert_eq!(decoded, originals);
    }
}
