//! Channel handler surface
//!
//! The live server resolves a channel to a [`ChannelHandler`] and forwards
//! subscribe and publish requests to it. Authentication has already happened
//! by the time a handler is called; the handler only sees the signed-in user.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use super::error::StreamError;

/// Authenticated caller of a channel request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInUser {
    /// Organization the user acts in
    pub org_id: i64,
    /// User login
    pub login: String,
}

impl SignedInUser {
    pub fn new(org_id: i64, login: impl Into<String>) -> Self {
        Self {
            org_id,
            login: login.into(),
        }
    }
}

/// Request to subscribe to a channel
#[derive(Debug, Clone)]
pub struct SubscribeEvent {
    /// Full channel name the subscriber listens on
    pub channel: String,
    /// Path part of the channel, relative to the handler's namespace
    pub path: String,
}

/// Reply to a subscribe request
#[derive(Debug, Clone, Default)]
pub struct SubscribeReply {
    /// Initial payload delivered to the new subscriber
    pub data: Option<Bytes>,
}

/// Outcome of a subscribe request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeStatus {
    Ok,
    NotFound,
    PermissionDenied,
}

/// Data published by a client into a channel
#[derive(Debug, Clone)]
pub struct PublishEvent {
    /// Full channel name
    pub channel: String,
    /// Path part of the channel, relative to the handler's namespace
    pub path: String,
    /// Encoded payload
    pub data: Bytes,
}

/// Reply to a publish request
#[derive(Debug, Clone, Default)]
pub struct PublishReply {
    /// Payload to publish instead of the original, if any
    pub data: Option<Bytes>,
}

/// Outcome of a publish request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    Ok,
    NotFound,
    PermissionDenied,
}

/// Handles subscribe and publish requests for a channel namespace
///
/// `ctx` is cancelled when the originating connection goes away.
#[async_trait]
pub trait ChannelHandler: Send + Sync {
    /// Called when a client subscribes to a channel
    async fn on_subscribe(
        &self,
        ctx: CancellationToken,
        user: &SignedInUser,
        event: SubscribeEvent,
    ) -> Result<(SubscribeReply, SubscribeStatus), StreamError>;

    /// Called when a client publishes into a channel
    async fn on_publish(
        &self,
        ctx: CancellationToken,
        user: &SignedInUser,
        event: PublishEvent,
    ) -> Result<(PublishReply, PublishStatus), StreamError>;
}
