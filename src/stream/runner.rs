//! Stream runner
//!
//! Process-wide directory of managed streams, keyed by organization and
//! stream id. Streams are created on first use and kept for the life of the
//! runner.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::publisher::ChannelPublisher;

use super::config::StreamConfig;
use super::managed::ManagedStream;

/// Keeps one [`ManagedStream`] per organization and stream id
///
/// Thread-safe via `RwLock`; lookups of existing streams only take the read
/// lock.
pub struct Runner {
    streams: RwLock<HashMap<i64, HashMap<String, Arc<ManagedStream>>>>,
    publisher: Arc<dyn ChannelPublisher>,
    config: Arc<StreamConfig>,
}

impl Runner {
    /// Create a runner with default stream configuration
    pub fn new(publisher: Arc<dyn ChannelPublisher>) -> Self {
        Self::with_config(publisher, StreamConfig::default())
    }

    /// Create a runner whose streams share `config`
    pub fn with_config(publisher: Arc<dyn ChannelPublisher>, config: StreamConfig) -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            publisher,
            config: Arc::new(config),
        }
    }

    /// Get the stream configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Snapshot of the streams of an organization
    ///
    /// The returned map is a copy; later stream creation does not show up
    /// in it.
    pub async fn streams(&self, org_id: i64) -> HashMap<String, Arc<ManagedStream>> {
        let streams = self.streams.read().await;
        streams.get(&org_id).cloned().unwrap_or_default()
    }

    /// Get the stream for a key, creating it if needed
    ///
    /// Concurrent callers for the same unseen key all receive one instance.
    pub async fn get_or_create_stream(&self, org_id: i64, stream_id: &str) -> Arc<ManagedStream> {
        if let Some(stream) = self.find(org_id, stream_id).await {
            return stream;
        }

        let mut streams = self.streams.write().await;
        let stream = streams
            .entry(org_id)
            .or_default()
            .entry(stream_id.to_string())
            .or_insert_with(|| {
                tracing::info!(org_id, stream = stream_id, "Managed stream created");
                Arc::new(ManagedStream::with_config(
                    stream_id,
                    Arc::clone(&self.publisher),
                    Arc::clone(&self.config),
                ))
            });
        Arc::clone(stream)
    }

    async fn find(&self, org_id: i64, stream_id: &str) -> Option<Arc<ManagedStream>> {
        let streams = self.streams.read().await;
        streams.get(&org_id)?.get(stream_id).cloned()
    }

    /// Number of streams of an organization
    pub async fn stream_count(&self, org_id: i64) -> usize {
        self.streams
            .read()
            .await
            .get(&org_id)
            .map_or(0, HashMap::len)
    }
}
