//! Managed streams
//!
//! A managed stream multiplexes frequently updated frames onto many
//! subscribers. It remembers the last frame per path so late joiners get the
//! current state at once, sends the schema only when it changes, and lets a
//! subscriber narrow a path down to a few fields.
//!
//! # Architecture
//!
//! ```text
//!                             Arc<Runner>
//!                    ┌──────────────────────────┐
//!                    │ streams: org_id ->       │
//!                    │   stream_id ->           │
//!                    │     Arc<ManagedStream>   │
//!                    └────────────┬─────────────┘
//!                                 │ get_or_create_stream()
//!                                 ▼
//!                  ┌───────────────────────────────┐
//!                  │ ManagedStream                 │
//!                  │   last:       (org, path) ->  │
//!                  │               FrameJsonCache  │
//!                  │   field_subs: (org, path) ->  │
//!                  │               channel->fields │
//!                  └───────────────┬───────────────┘
//!                                  │ push()
//!          ┌───────────────────────┼─────────────────────────┐
//!          ▼                       ▼                         ▼
//!  [narrowed frame]        [narrowed frame]      [full frame, schema diffed]
//!   field sub "c1"          field sub "c2"        stream/<id>/<path>
//!          └───────────────────────┴──────── ChannelPublisher::publish()
//! ```
//!
//! The cache and the subscription map are locked independently. A
//! subscription added or removed while a push is in flight may or may not
//! see that push; it sees the next one.

pub mod config;
pub mod error;
pub mod handler;
pub mod managed;
pub mod runner;
pub mod state;

pub use config::StreamConfig;
pub use error::StreamError;
pub use handler::{
    ChannelHandler, PublishEvent, PublishReply, PublishStatus, SignedInUser, SubscribeEvent,
    SubscribeReply, SubscribeStatus,
};
pub use managed::{ChannelInfo, ManagedStream};
pub use runner::Runner;
pub use state::FieldSubscription;
