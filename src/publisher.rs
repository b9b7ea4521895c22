//! Publish sinks
//!
//! A [`ChannelPublisher`] delivers an encoded payload to everyone listening on
//! a channel. Managed streams only ever talk to this trait; the transport
//! behind it is up to the embedding server.
//!
//! [`BroadcastPublisher`] is an in-process sink built on
//! `tokio::sync::broadcast`: one channel per `(org_id, channel)`, created on
//! first use. Payloads are `Bytes`, so every receiver shares one allocation.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::broadcast;

/// Default per-channel broadcast capacity
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Error returned by a publish sink
#[derive(Debug, Error)]
pub enum PublishError {
    /// Sink refused or failed to deliver
    #[error("publish failed: {0}")]
    Failed(String),

    /// Failure raised by the underlying transport
    #[error(transparent)]
    Transport(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Delivers payloads to every listener of a channel
#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    /// Publish `payload` on `channel` within `org_id`
    async fn publish(&self, org_id: i64, channel: &str, payload: Bytes)
        -> Result<(), PublishError>;
}

/// In-process publisher backed by broadcast channels
pub struct BroadcastPublisher {
    channels: Mutex<HashMap<(i64, String), broadcast::Sender<Bytes>>>,
    capacity: usize,
}

impl BroadcastPublisher {
    /// Create a publisher with the default per-channel capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BROADCAST_CAPACITY)
    }

    /// Create a publisher with a custom per-channel capacity
    ///
    /// Receivers lagging more than `capacity` payloads behind skip ahead.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Listen on a channel
    pub fn subscribe(&self, org_id: i64, channel: &str) -> broadcast::Receiver<Bytes> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry((org_id, channel.to_string()))
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of live receivers on a channel
    pub fn receiver_count(&self, org_id: i64, channel: &str) -> usize {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .get(&(org_id, channel.to_string()))
            .map_or(0, |tx| tx.receiver_count())
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelPublisher for BroadcastPublisher {
    async fn publish(
        &self,
        org_id: i64,
        channel: &str,
        payload: Bytes,
    ) -> Result<(), PublishError> {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);

        // No receivers is not a failure: delivery is best effort
        let delivered = channels
            .get(&(org_id, channel.to_string()))
            .map_or(0, |tx| tx.send(payload).unwrap_or(0));

        tracing::trace!(org_id, channel, receivers = delivered, "Payload broadcast");
        Ok(())
    }
}
