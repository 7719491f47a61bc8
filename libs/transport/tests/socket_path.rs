//! Path-based socket integration: connect, configure, exchange frames.

use std::os::unix::net::{UnixListener, UnixStream};
use std::time::Duration;

use codec::FrameBuffer;
use tempfile::tempdir;
use transport::{configure, recv_frame, send_frame};
use types::{Message, MsgFlags};

#[test]
fn frame_exchange_over_named_socket() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bus.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        configure(&stream, Some(Duration::from_secs(1))).unwrap();
        let mut fb = FrameBuffer::with_capacity(512).unwrap();
        let req = recv_frame(&stream, &mut fb, Some(Duration::from_secs(1))).unwrap();
        assert_eq!(req.data, b"ping");
        let reply = Message::new(0, req.msg_id, MsgFlags::REPLY, b"pong".to_vec());
        send_frame(&stream, &reply).unwrap();
    });

    let stream = UnixStream::connect(&path).unwrap();
    configure(&stream, Some(Duration::from_secs(1))).unwrap();
    send_frame(&stream, &Message::new(7, 5, MsgFlags::REPLY, b"ping".to_vec())).unwrap();

    let mut fb = FrameBuffer::with_capacity(512).unwrap();
    let reply = recv_frame(&stream, &mut fb, Some(Duration::from_secs(1))).unwrap();
    assert_eq!(reply.msg_id, 5);
    assert_eq!(reply.data, b"pong");

    server.join().unwrap();
}

#[test]
fn connect_to_missing_path_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nobody-home.sock");
    assert!(UnixStream::connect(&path).is_err());
}
