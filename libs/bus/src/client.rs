//! Client protocol: connect negotiation, request/response, publish, repair
//!
//! A client moves through disconnected → connected → (connected | broken).
//! Transport failures mark it broken; a broken client fails every
//! operation immediately until [`Client::repair`] reconnects it. The
//! client never reconnects on its own.

use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};
use types::{ControlId, Message, MsgFlags, CONTROL_ID_BASE};

use codec::FrameBuffer;

use crate::config::BusConfig;
use crate::error::{BusError, Result};
use crate::process::process_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    Connected,
    Broken,
}

/// A connection to a named broker socket
pub struct Client {
    config: BusConfig,
    server: String,
    path: PathBuf,
    stream: UnixStream,
    identity: i32,
    state: ConnState,
    rx: FrameBuffer,
}

impl Client {
    /// Connect to `<socket_dir>/<server>` and negotiate an identity.
    pub fn connect(config: &BusConfig, server: &str) -> Result<Self> {
        Self::connect_as(config, server, 0)
    }

    /// Connect re-requesting a previously assigned identity (repair path;
    /// `0` asks the broker for a fresh one).
    fn connect_as(config: &BusConfig, server: &str, identity: i32) -> Result<Self> {
        let path = config.socket_dir.join(server);
        let stream = UnixStream::connect(&path).map_err(|source| BusError::Connect {
            path: path.clone(),
            source,
        })?;
        transport::configure(&stream, Some(config.connect_timeout))?;
        let mut rx = FrameBuffer::with_capacity(config.buffer_size)?;

        // negotiation: announce the wanted identity and receive buffer
        // size, get the assigned identity back
        let hello = Message::new(
            identity,
            ControlId::Connect as i32,
            MsgFlags::REPLY,
            (config.buffer_size as u32).to_ne_bytes().to_vec(),
        );
        transport::send_frame(&stream, &hello)?;
        let reply = transport::recv_frame(&stream, &mut rx, Some(config.connect_timeout))?;
        if reply.msg_id != ControlId::Success as i32 {
            return Err(BusError::Negotiation {
                msg_id: reply.msg_id,
            });
        }
        let assigned = reply
            .data
            .first_chunk::<4>()
            .map(|bytes| i32::from_ne_bytes(*bytes))
            .unwrap_or(identity);

        info!(
            process = process_name(),
            server,
            identity = assigned,
            "connected to bus"
        );
        Ok(Self {
            config: config.clone(),
            server: server.to_string(),
            path,
            stream,
            identity: assigned,
            state: ConnState::Connected,
            rx,
        })
    }

    /// Identity assigned by the broker during negotiation.
    pub fn identity(&self) -> i32 {
        self.identity
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnState::Connected
    }

    pub(crate) fn stream(&self) -> &UnixStream {
        &self.stream
    }

    fn ensure_connected(&self) -> Result<()> {
        match self.state {
            ConnState::Connected => Ok(()),
            ConnState::Broken => Err(BusError::NotConnected),
        }
    }

    /// Mark the connection broken and pass the error through.
    fn broken<T>(&mut self, err: BusError) -> Result<T> {
        warn!(server = %self.server, error = %err, "marking client broken");
        self.state = ConnState::Broken;
        Err(err)
    }

    /// Synchronous request: send with the reply flag, await the reply,
    /// copy its payload into `reply_buf` clamped to capacity.
    ///
    /// Returns the clamped payload length.
    pub fn request(
        &mut self,
        msg_id: i32,
        payload: &[u8],
        reply_buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize> {
        self.ensure_connected()?;
        if !(0..CONTROL_ID_BASE as i32).contains(&msg_id) {
            return Err(BusError::ReservedId { msg_id });
        }

        let msg = Message::new(self.identity, msg_id, MsgFlags::REPLY, payload.to_vec());
        if let Err(err) = transport::send_frame(&self.stream, &msg) {
            return self.broken(err.into());
        }
        let reply = match transport::recv_frame(&self.stream, &mut self.rx, Some(timeout)) {
            Ok(reply) => reply,
            // a late reply would desynchronize the stream, so a timed-out
            // request also breaks the connection
            Err(err) => return self.broken(err.into()),
        };

        let n = reply.data.len().min(reply_buf.len());
        reply_buf[..n].copy_from_slice(&reply.data[..n]);
        debug!(msg_id, reply_len = reply.data.len(), copied = n, "request complete");
        Ok(n)
    }

    /// Fire-and-forget publish: wraps the payload in a notify envelope
    /// addressed to `to` (an identity or a broadcast sentinel).
    pub fn publish(&mut self, to: i32, topic: u64, msg_id: i32, payload: &[u8]) -> Result<()> {
        self.ensure_connected()?;
        let msg = codec::build_notify(self.identity, to, topic, msg_id, payload)?;
        if let Err(err) = transport::send_frame(&self.stream, &msg) {
            return self.broken(err.into());
        }
        Ok(())
    }

    /// Close a broken connection and reconnect, re-requesting the
    /// previously assigned identity.
    pub fn repair(&mut self) -> Result<()> {
        let _ = self.stream.shutdown(Shutdown::Both);
        let fresh = Self::connect_as(&self.config, &self.server, self.identity)?;
        info!(server = %self.server, identity = fresh.identity, "client repaired");
        *self = fresh;
        Ok(())
    }

    /// Receive one message on this connection.
    ///
    /// A timeout here is an idle tick, not a protocol failure, and leaves
    /// the connection state alone; other transport errors break it.
    pub(crate) fn recv(&mut self, timeout: Duration) -> Result<Message> {
        self.ensure_connected()?;
        match transport::recv_frame(&self.stream, &mut self.rx, Some(timeout)) {
            Ok(msg) => Ok(msg),
            Err(err @ transport::TransportError::Timeout { .. }) => Err(err.into()),
            Err(err) => self.broken(err.into()),
        }
    }

    /// Send a control message, optionally awaiting a success reply.
    pub(crate) fn control(
        &mut self,
        id: ControlId,
        data: Vec<u8>,
        await_reply: Option<Duration>,
    ) -> Result<()> {
        self.ensure_connected()?;
        let flags = if await_reply.is_some() {
            MsgFlags::REPLY
        } else {
            MsgFlags::empty()
        };
        let msg = Message::new(self.identity, id as i32, flags, data);
        if let Err(err) = transport::send_frame(&self.stream, &msg) {
            return self.broken(err.into());
        }
        if let Some(timeout) = await_reply {
            let reply = match transport::recv_frame(&self.stream, &mut self.rx, Some(timeout)) {
                Ok(reply) => reply,
                Err(err) => return self.broken(err.into()),
            };
            if reply.msg_id != ControlId::Success as i32 {
                return Err(BusError::Negotiation {
                    msg_id: reply.msg_id,
                });
            }
        }
        Ok(())
    }

    /// Observable socket path (diagnostics).
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("server", &self.server)
            .field("identity", &self.identity)
            .field("state", &self.state)
            .finish()
    }
}
