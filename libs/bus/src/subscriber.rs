//! Subscriber protocol: register, dispatch loop, unregister
//!
//! A subscription owns a dedicated client connection and a background
//! thread that exclusively owns its read side and framing buffer. Every
//! delivered notification is unpacked and handed to the user handler on
//! that thread; a slow handler stalls delivery on that subscription only.

use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, info, warn};
use types::{ControlId, Message, MsgFlags, CONTROL_ID_BASE};

use crate::client::Client;
use crate::config::BusConfig;
use crate::error::{BusError, Result};

/// Notification delivery capability
///
/// One method, invoked synchronously on the subscription's dispatch
/// thread. The return value is a status code; nonzero is logged and
/// otherwise ignored. Implemented for any suitable `FnMut` closure, whose
/// captures replace the C-style opaque context argument.
pub trait Notify: Send {
    fn deliver(&mut self, msg_id: i32, payload: &[u8]) -> i32;
}

impl<F> Notify for F
where
    F: FnMut(i32, &[u8]) -> i32 + Send,
{
    fn deliver(&mut self, msg_id: i32, payload: &[u8]) -> i32 {
        self(msg_id, payload)
    }
}

/// A live subscription: registration plus its dispatch thread
pub struct Subscription {
    server: String,
    topics: u64,
    identity: i32,
    /// Cloned write handle; the dispatch thread owns the read side
    writer: UnixStream,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Register for `topics` (a union of single-bit topics) on `server`.
    ///
    /// Performs the register handshake, sends the sync marker that opens
    /// the notification valve, and spawns the dispatch thread. The
    /// optional `reg_payload` rides along with the registration for
    /// broker-side bookkeeping.
    pub fn register(
        config: &BusConfig,
        server: &str,
        topics: u64,
        reg_payload: Option<&[u8]>,
        handler: impl Notify + 'static,
    ) -> Result<Subscription> {
        let mut client = Client::connect(config, server)?;

        let mut data = topics.to_ne_bytes().to_vec();
        if let Some(payload) = reg_payload {
            data.extend_from_slice(payload);
        }
        client.control(ControlId::Register, data, Some(config.connect_timeout))?;
        client.control(ControlId::Sync, Vec::new(), None)?;

        let writer = client
            .stream()
            .try_clone()
            .map_err(|source| BusError::Connect {
                path: client.path().to_path_buf(),
                source,
            })?;
        let identity = client.identity();
        let shutdown = Arc::new(AtomicBool::new(false));
        let tick = config.dispatch_tick;

        let loop_flag = Arc::clone(&shutdown);
        let thread_name = format!("bus-sub-{server}");
        let thread = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || dispatch_loop(client, handler, loop_flag, tick))
            .map_err(|source| BusError::Connect {
                path: config.socket_dir.join(server),
                source,
            })?;

        info!(server, topics = format_args!("{topics:#x}"), identity, "subscription registered");
        Ok(Subscription {
            server: server.to_string(),
            topics,
            identity,
            writer,
            shutdown,
            thread: Some(thread),
        })
    }

    /// Identity of the underlying connection.
    pub fn identity(&self) -> i32 {
        self.identity
    }

    /// Fire-and-forget outbound message on the subscription's own socket,
    /// interleaved with inbound delivery. No reply is awaited; a reply
    /// the broker sends anyway lands in the dispatch loop.
    pub fn report(&self, msg_id: i32, payload: &[u8]) -> Result<()> {
        if !(0..CONTROL_ID_BASE as i32).contains(&msg_id) {
            return Err(BusError::ReservedId { msg_id });
        }
        let msg = Message::new(self.identity, msg_id, MsgFlags::empty(), payload.to_vec());
        transport::send_frame(&self.writer, &msg)?;
        Ok(())
    }

    /// Publish through the subscription's connection.
    pub fn publish(&self, to: i32, topic: u64, msg_id: i32, payload: &[u8]) -> Result<()> {
        let msg = codec::build_notify(self.identity, to, topic, msg_id, payload)?;
        transport::send_frame(&self.writer, &msg)?;
        Ok(())
    }

    /// Tear the subscription down: best-effort unregister message, stop
    /// the dispatch loop, join the thread, close the socket.
    pub fn unregister(mut self) -> Result<()> {
        self.teardown();
        Ok(())
    }

    fn teardown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let bye = Message::new(
            self.identity,
            ControlId::Unregister as i32,
            MsgFlags::empty(),
            self.topics.to_ne_bytes().to_vec(),
        );
        if let Err(err) = transport::send_frame(&self.writer, &bye) {
            debug!(server = %self.server, error = %err, "unregister send failed");
        }
        self.shutdown.store(true, Ordering::Release);
        // closing the shared socket wakes the dispatch loop immediately
        let _ = self.writer.shutdown(Shutdown::Both);
        if thread.join().is_err() {
            warn!(server = %self.server, "dispatch thread panicked");
        }
        info!(server = %self.server, "subscription closed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("server", &self.server)
            .field("topics", &self.topics)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Receive loop: runs for the lifetime of the subscription on its own
/// thread, which exclusively owns the client's read side.
fn dispatch_loop(
    mut client: Client,
    mut handler: impl Notify,
    shutdown: Arc<AtomicBool>,
    tick: std::time::Duration,
) {
    while !shutdown.load(Ordering::Acquire) {
        let msg = match client.recv(tick) {
            Ok(msg) => msg,
            Err(BusError::Transport(transport::TransportError::Timeout { .. })) => {
                // housekeeping tick; re-check the shutdown flag
                continue;
            }
            Err(BusError::Transport(transport::TransportError::PeerClosed)) => {
                if !shutdown.load(Ordering::Acquire) {
                    warn!("broker closed the subscription connection");
                }
                break;
            }
            Err(err) => {
                if !shutdown.load(Ordering::Acquire) {
                    warn!(error = %err, "subscription receive failed");
                }
                break;
            }
        };

        if msg.msg_id != ControlId::Notify as i32 {
            debug!(msg_id = msg.msg_id, "ignoring non-notify frame on subscription");
            continue;
        }
        match codec::unpack_notify(&msg.data) {
            Ok((envelope, payload)) => {
                let status = handler.deliver(envelope.msg_id, payload);
                if status != 0 {
                    warn!(msg_id = envelope.msg_id, status, "notify handler reported failure");
                }
            }
            Err(err) => {
                warn!(error = %err, "dropping notify with bad envelope");
            }
        }
    }
    debug!("dispatch loop exiting");
}
