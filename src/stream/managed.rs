//! Managed stream
//!
//! Owns the last-value cache and field subscriptions of one stream id and
//! fans pushed frames out through the publish sink.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::channel::Channel;
use crate::frame::{Frame, FrameJsonCache, Include};
use crate::publisher::ChannelPublisher;

use super::config::StreamConfig;
use super::error::StreamError;
use super::handler::{
    ChannelHandler, PublishEvent, PublishReply, PublishStatus, SignedInUser, SubscribeEvent,
    SubscribeReply, SubscribeStatus,
};
use super::state::{parse_field_selector, FieldSubscription, FieldSubscriptions, LastValues};

/// Discovery record for one cached path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Synthesized channel name
    pub channel: String,
    /// Schema-only rendering of the cached frame
    pub data: Bytes,
}

/// State of a managed stream
pub struct ManagedStream {
    id: String,
    started_at: Instant,
    last: LastValues,
    field_subs: Arc<FieldSubscriptions>,
    publisher: Arc<dyn ChannelPublisher>,
    config: Arc<StreamConfig>,
}

impl ManagedStream {
    /// Create a stream with default configuration
    pub fn new(id: impl Into<String>, publisher: Arc<dyn ChannelPublisher>) -> Self {
        Self::with_config(id, publisher, Arc::new(StreamConfig::default()))
    }

    /// Create a stream with shared configuration
    pub fn with_config(
        id: impl Into<String>,
        publisher: Arc<dyn ChannelPublisher>,
        config: Arc<StreamConfig>,
    ) -> Self {
        Self {
            id: id.into(),
            started_at: Instant::now(),
            last: LastValues::default(),
            field_subs: Arc::new(FieldSubscriptions::default()),
            publisher,
            config,
        }
    }

    /// Stream id, the namespace of its canonical channels
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the stream was created
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Time since the stream was created
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// The handler serving every path of this stream
    pub fn handler_for_path(self: &Arc<Self>, _path: &str) -> Arc<dyn ChannelHandler> {
        Arc::clone(self) as Arc<dyn ChannelHandler>
    }

    /// List the cached paths of an organization for discovery
    ///
    /// Each entry is named `prefix + path + discovery_suffix` and carries the
    /// schema of the last frame pushed to that path.
    pub async fn list_channels(&self, org_id: i64, prefix: &str) -> Vec<ChannelInfo> {
        self.last
            .snapshot(org_id)
            .await
            .into_iter()
            .map(|(path, frame)| ChannelInfo {
                channel: format!("{}{}{}", prefix, path, self.config.discovery_suffix),
                data: frame.bytes(Include::SchemaOnly),
            })
            .collect()
    }

    /// Push a frame to a path
    ///
    /// The frame becomes the path's last value. Subscribers receive data
    /// only if the schema matches the previous frame, schema and data
    /// otherwise. Field subscribers of the path get a narrowed copy first,
    /// then the full frame goes to the canonical channel
    /// `stream/<id>/<path>`. The first publish failure ends the push.
    pub async fn push(&self, org_id: i64, path: &str, frame: &Frame) -> Result<(), StreamError> {
        let msg = FrameJsonCache::from_frame(frame).map_err(|e| {
            tracing::error!(stream = %self.id, org_id, path, error = %e, "Error encoding frame");
            e
        })?;

        let slot = self.last.slot(org_id, path).await;
        let _order = slot.lock_order().await;

        let include = match slot.replace(msg.clone()).await {
            // Schema unchanged, send just the data
            Some(last) if last.same_schema(&msg) => Include::DataOnly,
            _ => Include::All,
        };

        let subs = self.field_subs.for_path(org_id, path);
        tracing::trace!(
            stream = %self.id,
            org_id,
            path,
            include = ?include,
            subscriptions = ?subs,
            "Pushing frame"
        );

        for sub in &subs {
            let narrowed = frame.with_fields(
                sub.fields.as_slice(),
                self.config.always_include.as_slice(),
            );
            let payload = narrowed.to_json(include)?;
            self.publish(org_id, &sub.channel, payload).await?;
        }

        let channel = Channel::stream(self.id.as_str(), path).to_string();
        self.publish(org_id, &channel, msg.bytes(include)).await
    }

    async fn publish(&self, org_id: i64, channel: &str, payload: Bytes) -> Result<(), StreamError> {
        tracing::debug!(
            org_id,
            channel,
            data_length = payload.len(),
            "Publish data to channel"
        );

        self.publisher
            .publish(org_id, channel, payload)
            .await
            .map_err(|source| StreamError::Publish {
                channel: channel.to_string(),
                source,
            })
    }

    /// Last frame pushed to a path, rendered with schema and data
    pub async fn last_packet(&self, org_id: i64, path: &str) -> Option<Bytes> {
        self.last
            .get(org_id, path)
            .await
            .map(|frame| frame.bytes(Include::All))
    }

    /// Active field subscriptions of a path, ordered by channel
    pub async fn field_subscriptions(&self, org_id: i64, path: &str) -> Vec<FieldSubscription> {
        self.field_subs.for_path(org_id, path)
    }

    /// Register a field subscription that lives until `ctx` is cancelled
    fn subscribe_fields(
        &self,
        ctx: CancellationToken,
        org_id: i64,
        path: &str,
        channel: &str,
        fields: Vec<String>,
    ) {
        tracing::debug!(
            stream = %self.id,
            org_id,
            path,
            channel,
            fields = ?fields,
            "Field subscription added"
        );
        let id = self.field_subs.insert(org_id, path, channel, fields);

        let subs = Arc::clone(&self.field_subs);
        let stream = self.id.clone();
        let path = path.to_string();
        let channel = channel.to_string();
        tokio::spawn(async move {
            ctx.cancelled().await;
            if subs.remove(org_id, &path, &channel, id) {
                tracing::debug!(
                    stream = %stream,
                    org_id,
                    path = %path,
                    channel = %channel,
                    "Field subscription removed"
                );
            }
        });
    }
}

#[async_trait]
impl ChannelHandler for ManagedStream {
    /// Subscribe to a path, optionally narrowed to some fields
    ///
    /// A path such as `cpu/value,idle` subscribes the channel to the `value`
    /// and `idle` fields of `cpu` until `ctx` is cancelled. The reply carries
    /// the last frame of the base path, if any.
    async fn on_subscribe(
        &self,
        ctx: CancellationToken,
        user: &SignedInUser,
        event: SubscribeEvent,
    ) -> Result<(SubscribeReply, SubscribeStatus), StreamError> {
        let path = match parse_field_selector(&event.path, self.config.field_separator) {
            Some((base, fields)) => {
                self.subscribe_fields(ctx, user.org_id, base, &event.channel, fields);
                base
            }
            None => event.path.as_str(),
        };

        let reply = SubscribeReply {
            data: self.last_packet(user.org_id, path).await,
        };
        Ok((reply, SubscribeStatus::Ok))
    }

    /// Decode an inbound frame and push it to the event's path
    async fn on_publish(
        &self,
        _ctx: CancellationToken,
        user: &SignedInUser,
        event: PublishEvent,
    ) -> Result<(PublishReply, PublishStatus), StreamError> {
        let frame = Frame::from_json(&event.data)?;
        self.push(user.org_id, &event.path, &frame).await?;
        Ok((PublishReply::default(), PublishStatus::Ok))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::Notify;

    use crate::frame::Field;
    use crate::publisher::PublishError;

    use super::*;

    #[derive(Default)]
    struct RecordingPublisher {
        calls: Mutex<Vec<(i64, String, Bytes)>>,
        fail_on: Option<String>,
    }

    impl RecordingPublisher {
        fn failing_on(channel: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: Some(channel.to_string()),
            }
        }

        fn take(&self) -> Vec<(i64, String, Bytes)> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    #[async_trait]
    impl ChannelPublisher for RecordingPublisher {
        async fn publish(
            &self,
            org_id: i64,
            channel: &str,
            payload: Bytes,
        ) -> Result<(), PublishError> {
            self.calls
                .lock()
                .unwrap()
                .push((org_id, channel.to_string(), payload));
            if self.fail_on.as_deref() == Some(channel) {
                return Err(PublishError::Failed("sink down".into()));
            }
            Ok(())
        }
    }

    /// Sink that stalls on one channel and records every publish
    struct SlowPublisher {
        slow_channel: String,
        delay: Duration,
        entered: Notify,
        calls: Mutex<Vec<(String, Bytes)>>,
    }

    #[async_trait]
    impl ChannelPublisher for SlowPublisher {
        async fn publish(
            &self,
            _org_id: i64,
            channel: &str,
            payload: Bytes,
        ) -> Result<(), PublishError> {
            if channel == self.slow_channel {
                self.entered.notify_one();
                tokio::time::sleep(self.delay).await;
            }
            self.calls
                .lock()
                .unwrap()
                .push((channel.to_string(), payload));
            Ok(())
        }
    }

    fn channels(calls: &[(i64, String, Bytes)]) -> Vec<&str> {
        calls.iter().map(|(_, ch, _)| ch.as_str()).collect()
    }

    fn cpu_frame(value: f64) -> Frame {
        Frame::new("cpu")
            .with_field(Field::time("time", [1000]))
            .with_field(Field::string("labels", ["host=a"]))
            .with_field(Field::number("value", [value]))
            .with_field(Field::number("idle", [100.0 - value]))
    }

    fn setup() -> (Arc<RecordingPublisher>, Arc<ManagedStream>) {
        let publisher = Arc::new(RecordingPublisher::default());
        let stream = Arc::new(ManagedStream::new("telegraf", publisher.clone()));
        (publisher, stream)
    }

    fn user(org_id: i64) -> SignedInUser {
        SignedInUser::new(org_id, "admin")
    }

    fn subscribe_event(channel: &str, path: &str) -> SubscribeEvent {
        SubscribeEvent {
            channel: channel.to_string(),
            path: path.to_string(),
        }
    }

    fn field_names(payload: &Bytes) -> Vec<String> {
        let frame = Frame::from_json(payload).unwrap();
        frame.fields.into_iter().map(|f| f.name).collect()
    }

    async fn wait_for_no_subscriptions(stream: &ManagedStream, org_id: i64, path: &str) {
        for _ in 0..100 {
            if stream.field_subscriptions(org_id, path).await.is_empty() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("field subscription was not removed");
    }

    #[tokio::test]
    async fn test_push_sends_schema_once() {
        let (publisher, stream) = setup();

        stream.push(1, "cpu", &cpu_frame(1.0)).await.unwrap();
        stream.push(1, "cpu", &cpu_frame(2.0)).await.unwrap();

        let calls = publisher.take();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, "stream/telegraf/cpu");
        assert_eq!(calls[0].2, cpu_frame(1.0).to_json(Include::All).unwrap());
        assert_eq!(calls[1].2, cpu_frame(2.0).to_json(Include::DataOnly).unwrap());
    }

    #[tokio::test]
    async fn test_push_resends_schema_on_change() {
        let (publisher, stream) = setup();

        let changed = cpu_frame(1.0).with_field(Field::number("system", [3.0]));
        stream.push(1, "cpu", &cpu_frame(1.0)).await.unwrap();
        stream.push(1, "cpu", &changed).await.unwrap();
        stream.push(1, "cpu", &changed).await.unwrap();

        let calls = publisher.take();
        assert_eq!(calls[1].2, changed.to_json(Include::All).unwrap());
        assert_eq!(calls[2].2, changed.to_json(Include::DataOnly).unwrap());
    }

    #[tokio::test]
    async fn test_schema_cache_per_org_and_path() {
        let (publisher, stream) = setup();

        stream.push(1, "cpu", &cpu_frame(1.0)).await.unwrap();
        stream.push(2, "cpu", &cpu_frame(1.0)).await.unwrap();
        stream.push(1, "mem", &cpu_frame(1.0)).await.unwrap();

        let full = cpu_frame(1.0).to_json(Include::All).unwrap();
        let calls = publisher.take();
        assert!(calls.iter().all(|(_, _, payload)| *payload == full));
        assert_eq!(calls[1].0, 2);
        assert_eq!(calls[2].1, "stream/telegraf/mem");
    }

    #[tokio::test]
    async fn test_push_encode_failure_leaves_state_untouched() {
        let (publisher, stream) = setup();

        let ragged = cpu_frame(1.0).with_field(Field::number("bad", [1.0, 2.0]));
        let result = stream.push(1, "cpu", &ragged).await;

        assert!(matches!(result, Err(StreamError::Codec(_))));
        assert!(publisher.take().is_empty());
        assert!(stream.last_packet(1, "cpu").await.is_none());
        assert!(stream.list_channels(1, "").await.is_empty());
    }

    #[tokio::test]
    async fn test_list_channels() {
        let (_publisher, stream) = setup();
        assert!(stream.list_channels(1, "stream/telegraf/").await.is_empty());

        stream.push(1, "cpu", &cpu_frame(1.0)).await.unwrap();

        let channels = stream.list_channels(1, "stream/telegraf/").await;
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].channel, "stream/telegraf/cpu/usage_user");
        assert_eq!(
            channels[0].data,
            cpu_frame(1.0).to_json(Include::SchemaOnly).unwrap()
        );
        assert!(stream.list_channels(2, "stream/telegraf/").await.is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_without_selector() {
        let (_publisher, stream) = setup();
        let ctx = CancellationToken::new();

        let (reply, status) = stream
            .on_subscribe(ctx.clone(), &user(1), subscribe_event("stream/telegraf/cpu", "cpu"))
            .await
            .unwrap();
        assert_eq!(status, SubscribeStatus::Ok);
        assert!(reply.data.is_none());
        assert!(stream.field_subscriptions(1, "cpu").await.is_empty());

        stream.push(1, "cpu", &cpu_frame(1.0)).await.unwrap();
        let (reply, _) = stream
            .on_subscribe(ctx, &user(1), subscribe_event("stream/telegraf/cpu", "cpu"))
            .await
            .unwrap();
        assert_eq!(reply.data, Some(cpu_frame(1.0).to_json(Include::All).unwrap()));
    }

    #[tokio::test]
    async fn test_subscribe_reply_carries_full_last_value() {
        let (_publisher, stream) = setup();
        stream.push(1, "cpu", &cpu_frame(1.0)).await.unwrap();
        stream.push(1, "cpu", &cpu_frame(2.0)).await.unwrap();

        let (reply, _) = stream
            .on_subscribe(
                CancellationToken::new(),
                &user(1),
                subscribe_event("stream/telegraf/cpu/value", "cpu/value"),
            )
            .await
            .unwrap();

        // Late joiners always get the schema
        assert_eq!(reply.data, Some(cpu_frame(2.0).to_json(Include::All).unwrap()));
    }

    #[tokio::test]
    async fn test_field_subscription_narrows_frames() {
        let (publisher, stream) = setup();
        stream.push(1, "cpu", &cpu_frame(1.0)).await.unwrap();
        publisher.take();

        let ctx = CancellationToken::new();
        stream
            .on_subscribe(ctx.clone(), &user(1), subscribe_event("c1", "cpu/value"))
            .await
            .unwrap();

        let subs = stream.field_subscriptions(1, "cpu").await;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].channel, "c1");
        assert_eq!(subs[0].fields, vec!["value".to_string()]);

        stream.push(1, "cpu", &cpu_frame(3.0)).await.unwrap();

        let calls = publisher.take();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, "c1");
        assert_eq!(calls[1].1, "stream/telegraf/cpu");

        // Schema unchanged since last push: subscribers get data only
        let narrowed = cpu_frame(3.0).with_fields(&["value"], &["labels"]);
        assert_eq!(calls[0].2, narrowed.to_json(Include::DataOnly).unwrap());
    }

    #[tokio::test]
    async fn test_field_subscription_receives_schema_on_first_push() {
        let (publisher, stream) = setup();
        stream
            .on_subscribe(
                CancellationToken::new(),
                &user(1),
                subscribe_event("c1", "cpu/value,idle"),
            )
            .await
            .unwrap();

        stream.push(1, "cpu", &cpu_frame(3.0)).await.unwrap();

        let calls = publisher.take();
        assert_eq!(calls[0].1, "c1");
        assert_eq!(field_names(&calls[0].2), vec!["time", "labels", "value", "idle"]);
    }

    #[tokio::test]
    async fn test_cancel_removes_field_subscription() {
        let (publisher, stream) = setup();
        let ctx = CancellationToken::new();
        stream
            .on_subscribe(ctx.clone(), &user(1), subscribe_event("c1", "cpu/value"))
            .await
            .unwrap();

        ctx.cancel();
        wait_for_no_subscriptions(&stream, 1, "cpu").await;

        stream.push(1, "cpu", &cpu_frame(3.0)).await.unwrap();
        let calls = publisher.take();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "stream/telegraf/cpu");
    }

    #[tokio::test]
    async fn test_resubscribe_survives_stale_cancel() {
        let (_publisher, stream) = setup();
        let first = CancellationToken::new();
        let second = CancellationToken::new();

        stream
            .on_subscribe(first.clone(), &user(1), subscribe_event("c1", "cpu/value"))
            .await
            .unwrap();
        stream
            .on_subscribe(second.clone(), &user(1), subscribe_event("c1", "cpu/idle"))
            .await
            .unwrap();

        first.cancel();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let subs = stream.field_subscriptions(1, "cpu").await;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].fields, vec!["idle".to_string()]);

        second.cancel();
        wait_for_no_subscriptions(&stream, 1, "cpu").await;
    }

    #[tokio::test]
    async fn test_subscriber_publish_failure_aborts_push() {
        let publisher = Arc::new(RecordingPublisher::failing_on("c1"));
        let stream = ManagedStream::new("telegraf", publisher.clone());
        stream
            .on_subscribe(CancellationToken::new(), &user(1), subscribe_event("c1", "cpu/value"))
            .await
            .unwrap();

        let result = stream.push(1, "cpu", &cpu_frame(1.0)).await;

        assert!(matches!(
            result,
            Err(StreamError::Publish { ref channel, .. }) if channel == "c1"
        ));
        // Canonical publish skipped, but the frame is cached
        assert_eq!(channels(&publisher.take()), vec!["c1"]);
        assert!(stream.last_packet(1, "cpu").await.is_some());
    }

    #[tokio::test]
    async fn test_field_subscriptions_with_different_fields() {
        let (publisher, stream) = setup();
        let ctx = CancellationToken::new();
        stream
            .on_subscribe(ctx.clone(), &user(1), subscribe_event("c1", "cpu/value"))
            .await
            .unwrap();
        stream
            .on_subscribe(ctx, &user(1), subscribe_event("c2", "cpu/idle"))
            .await
            .unwrap();

        stream.push(1, "cpu", &cpu_frame(4.0)).await.unwrap();

        let calls = publisher.take();
        assert_eq!(channels(&calls), vec!["c1", "c2", "stream/telegraf/cpu"]);
        assert_eq!(field_names(&calls[0].2), vec!["time", "labels", "value"]);
        assert_eq!(field_names(&calls[1].2), vec!["time", "labels", "idle"]);
        assert_eq!(
            field_names(&calls[2].2),
            vec!["time", "labels", "value", "idle"]
        );
    }

    #[tokio::test]
    async fn test_first_subscriber_failure_skips_the_rest() {
        let publisher = Arc::new(RecordingPublisher::failing_on("bad"));
        let stream = ManagedStream::new("telegraf", publisher.clone());
        let ctx = CancellationToken::new();
        stream
            .on_subscribe(ctx.clone(), &user(1), subscribe_event("bad", "cpu/value"))
            .await
            .unwrap();
        stream
            .on_subscribe(ctx, &user(1), subscribe_event("c2", "cpu/idle"))
            .await
            .unwrap();

        let result = stream.push(1, "cpu", &cpu_frame(1.0)).await;

        assert!(matches!(
            result,
            Err(StreamError::Publish { ref channel, .. }) if channel == "bad"
        ));
        // Neither "c2" nor the canonical channel is attempted
        assert_eq!(channels(&publisher.take()), vec!["bad"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_slow_path_does_not_block_others_and_keeps_order() {
        let publisher = Arc::new(SlowPublisher {
            slow_channel: "stream/telegraf/slow".to_string(),
            delay: Duration::from_millis(300),
            entered: Notify::new(),
            calls: Mutex::new(Vec::new()),
        });
        let stream = Arc::new(ManagedStream::new("telegraf", publisher.clone()));

        let first = {
            let stream = Arc::clone(&stream);
            tokio::spawn(async move { stream.push(1, "slow", &cpu_frame(1.0)).await })
        };
        publisher.entered.notified().await;

        // Same path: waits for the first push to finish publishing
        let second = {
            let stream = Arc::clone(&stream);
            tokio::spawn(async move { stream.push(1, "slow", &cpu_frame(2.0)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Other path: completes while the slow push is in the sink
        let fast = tokio::time::timeout(
            Duration::from_millis(100),
            stream.push(1, "fast", &cpu_frame(3.0)),
        )
        .await;
        assert!(matches!(fast, Ok(Ok(()))));
        assert!(!first.is_finished());
        assert!(!second.is_finished());

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let slow: Vec<Bytes> = publisher
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(ch, _)| ch == "stream/telegraf/slow")
            .map(|(_, payload)| payload.clone())
            .collect();
        assert_eq!(
            slow,
            vec![
                cpu_frame(1.0).to_json(Include::All).unwrap(),
                cpu_frame(2.0).to_json(Include::DataOnly).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_canonical_publish_failure_returned() {
        let publisher = Arc::new(RecordingPublisher::failing_on("stream/telegraf/cpu"));
        let stream = ManagedStream::new("telegraf", publisher);

        let result = stream.push(1, "cpu", &cpu_frame(1.0)).await;
        assert!(matches!(result, Err(StreamError::Publish { .. })));
    }

    #[tokio::test]
    async fn test_on_publish_pushes_decoded_frame() {
        let (publisher, stream) = setup();
        let event = PublishEvent {
            channel: "stream/telegraf/cpu".to_string(),
            path: "cpu".to_string(),
            data: cpu_frame(1.0).to_json(Include::All).unwrap(),
        };

        let (reply, status) = stream
            .on_publish(CancellationToken::new(), &user(1), event)
            .await
            .unwrap();

        assert_eq!(status, PublishStatus::Ok);
        assert!(reply.data.is_none());
        assert_eq!(publisher.take().len(), 1);
        assert!(stream.last_packet(1, "cpu").await.is_some());
    }

    #[tokio::test]
    async fn test_on_publish_rejects_bad_frame() {
        let (publisher, stream) = setup();
        let event = PublishEvent {
            channel: "stream/telegraf/cpu".to_string(),
            path: "cpu".to_string(),
            data: Bytes::from_static(b"{\"data\":{}}"),
        };

        let result = stream
            .on_publish(CancellationToken::new(), &user(1), event)
            .await;

        assert!(matches!(result, Err(StreamError::Codec(_))));
        assert!(publisher.take().is_empty());
    }

    #[tokio::test]
    async fn test_handler_for_path_is_stream() {
        let (publisher, stream) = setup();
        let handler = stream.handler_for_path("anything");

        let event = PublishEvent {
            channel: "stream/telegraf/mem".to_string(),
            path: "mem".to_string(),
            data: cpu_frame(1.0).to_json(Include::All).unwrap(),
        };
        handler
            .on_publish(CancellationToken::new(), &user(1), event)
            .await
            .unwrap();

        assert_eq!(publisher.take()[0].1, "stream/telegraf/mem");
        assert_eq!(stream.id(), "telegraf");
    }
}
