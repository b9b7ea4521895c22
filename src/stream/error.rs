//! Managed stream error types

use thiserror::Error;

use crate::frame::CodecError;
use crate::publisher::PublishError;

/// Error type for stream operations
#[derive(Debug, Error)]
pub enum StreamError {
    /// Frame could not be encoded or decoded
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Publish sink failed; remaining fan-out for the push was skipped
    #[error("failed to publish to channel {channel}")]
    Publish {
        channel: String,
        #[source]
        source: PublishError,
    },
}
