//! Convenience facade: one-shot publish/request, subscription management
//!
//! `publish` and `request` open a fresh client, perform exactly one
//! operation and close the connection. That trades connect overhead for
//! immunity to long-lived-connection failure modes; only subscriptions
//! keep a persistent socket, because inbound delivery needs one.

use std::time::Duration;

use crate::client::Client;
use crate::config::BusConfig;
use crate::error::Result;
use crate::subscriber::{Notify, Subscription};

/// Publish one notification through a short-lived connection.
pub fn publish(
    config: &BusConfig,
    server: &str,
    to: i32,
    topic: u64,
    msg_id: i32,
    payload: &[u8],
) -> Result<()> {
    let mut client = Client::connect(config, server)?;
    client.publish(to, topic, msg_id, payload)
    // client drops here, closing the connection
}

/// Perform one request/response exchange through a short-lived
/// connection. Returns the reply length after clamping to `reply_buf`.
pub fn request(
    config: &BusConfig,
    server: &str,
    msg_id: i32,
    payload: &[u8],
    reply_buf: &mut [u8],
    timeout: Option<Duration>,
) -> Result<usize> {
    let mut client = Client::connect(config, server)?;
    let timeout = timeout.unwrap_or(config.request_timeout);
    client.request(msg_id, payload, reply_buf, timeout)
}

/// Register a persistent subscription; see [`Subscription::register`].
pub fn register(
    config: &BusConfig,
    server: &str,
    topics: u64,
    reg_payload: Option<&[u8]>,
    handler: impl Notify + 'static,
) -> Result<Subscription> {
    Subscription::register(config, server, topics, reg_payload, handler)
}

/// Tear down a subscription; see [`Subscription::unregister`].
pub fn unregister(subscription: Subscription) -> Result<()> {
    subscription.unregister()
}
