//! Message-level send and receive over a framing buffer
//!
//! `recv_frame` accumulates bytes across possibly many partial reads until
//! a complete, token-valid message decodes. With no timeout configured it
//! performs at most one nonblocking read and reports an incomplete frame
//! instead of looping.

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::time::{Duration, Instant};

use tracing::debug;
use types::Message;

use codec::FrameBuffer;

use crate::error::{Result, TransportError};
use crate::socket::{read_once, wait_readable, Readiness};

/// Encode and send one message as a single full-buffer write.
pub fn send_frame(stream: &UnixStream, msg: &Message) -> Result<()> {
    let wire = codec::encode(msg)?;
    (&*stream)
        .write_all(&wire)
        .map_err(|source| TransportError::Send { source })?;
    debug!(msg_id = msg.msg_id, bytes = wire.len(), "sent frame");
    Ok(())
}

/// Receive one complete message, accumulating into `fb`.
///
/// - `Some(timeout)`: bounded by a deadline across all partial reads.
/// - `None`: immediate semantics — one nonblocking read at most, then
///   [`TransportError::Incomplete`] if no full frame decoded.
///
/// A full buffer without a complete frame is [`TransportError::NoSpace`],
/// which no amount of further reading can fix.
pub fn recv_frame(
    stream: &UnixStream,
    fb: &mut FrameBuffer,
    timeout: Option<Duration>,
) -> Result<Message> {
    let deadline = timeout.map(|t| Instant::now() + t);
    let timeout_ms = timeout.map(|t| t.as_millis() as u64).unwrap_or(0);
    let mut read_attempted = false;

    loop {
        if let Some(frame) = fb.next_frame()? {
            let msg = frame.to_message();
            debug!(msg_id = msg.msg_id, len = msg.data.len(), "received frame");
            return Ok(msg);
        }
        if fb.is_full() {
            return Err(TransportError::NoSpace {
                capacity: fb.capacity(),
            });
        }

        match deadline {
            None => {
                if read_attempted {
                    return Err(TransportError::Incomplete);
                }
                match read_once(stream, fb.writable())? {
                    Some(n) => {
                        fb.commit(n);
                        read_attempted = true;
                    }
                    None => return Err(TransportError::Incomplete),
                }
            }
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match wait_readable(stream, remaining)? {
                    Readiness::TimedOut => {
                        return Err(TransportError::timeout("recv_frame", timeout_ms))
                    }
                    Readiness::Ready => {}
                }
                if let Some(n) = read_once(stream, fb.writable())? {
                    fb.commit(n);
                }
            }
        }
    }
}
