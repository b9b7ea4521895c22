//! Live data frame distribution
//!
//! Multiplexes frequently updated data frames onto many concurrent
//! subscribers, keyed by organization and stream path:
//!
//! - the last frame of every path is kept, so late joiners get the current
//!   state immediately
//! - the schema is sent only when it changes; otherwise subscribers get data
//!   only
//! - a subscriber can narrow a path down to a few fields without affecting
//!   other subscribers of the same path
//!
//! Delivery goes through a [`ChannelPublisher`]. [`BroadcastPublisher`]
//! provides an in-process one.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use managed_stream::{BroadcastPublisher, Field, Frame, Runner};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), managed_stream::StreamError> {
//! let publisher = Arc::new(BroadcastPublisher::new());
//! let mut rx = publisher.subscribe(1, "stream/telegraf/cpu");
//!
//! let runner = Runner::new(publisher.clone());
//! let stream = runner.get_or_create_stream(1, "telegraf").await;
//!
//! let frame = Frame::new("cpu")
//!     .with_field(Field::time("time", [1_700_000_000_000]))
//!     .with_field(Field::number("value", [0.42]));
//! stream.push(1, "cpu", &frame).await?;
//!
//! // First push of a path carries the schema
//! let payload = rx.recv().await.unwrap();
//! assert!(payload.starts_with(b"{\"schema\""));
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod frame;
pub mod publisher;
pub mod stream;

pub use channel::{Channel, ChannelError, Scope};
pub use frame::{CodecError, Field, FieldType, FieldValues, Frame, FrameJsonCache, Include};
pub use publisher::{BroadcastPublisher, ChannelPublisher, PublishError};
pub use stream::{
    ChannelHandler, ChannelInfo, FieldSubscription, ManagedStream, PublishEvent, PublishReply,
    PublishStatus, Runner, SignedInUser, StreamConfig, StreamError, SubscribeEvent,
    SubscribeReply, SubscribeStatus,
};
