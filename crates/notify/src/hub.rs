// Notification Hub - topic-keyed registry of live subscriber connections

use offload_core::domain::StateRecord;
use offload_core::port::NotificationPublisher;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Per-connection outbound buffer capacity.
///
/// The protocol delivers one message per topic, so anything above a handful
/// only exists to absorb a subscriber that is slow to start reading. A full
/// buffer drops the message for that connection instead of stalling publish.
pub const DEFAULT_CONNECTION_BUFFER: usize = 16;

/// A notification as delivered to a subscriber connection.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub topic: String,
    pub record: StateRecord,
}

type ConnectionId = u64;
type TopicRegistry = HashMap<String, HashMap<ConnectionId, mpsc::Sender<NotificationMessage>>>;

fn remove_connection(registry: &RwLock<TopicRegistry>, topic: &str, conn_id: ConnectionId) {
    let mut topics = registry.write().unwrap();
    if let Some(connections) = topics.get_mut(topic) {
        connections.remove(&conn_id);
        if connections.is_empty() {
            topics.remove(topic);
        }
    }
}

/// Best-effort pub/sub hub.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared between the dispatcher (publish side) and the RPC layer
/// (subscribe side).
pub struct NotificationHub {
    topics: Arc<RwLock<TopicRegistry>>,
    next_conn_id: AtomicU64,
    buffer: usize,
}

impl NotificationHub {
    /// Create a hub with a specific per-connection buffer capacity.
    pub fn new(buffer: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            next_conn_id: AtomicU64::new(1),
            buffer,
        }
    }

    /// Register a live connection under `topic`.
    ///
    /// The returned handle owns the receiving end and deregisters itself when
    /// dropped, so a subscription can never outlive its consumer.
    pub fn subscribe(&self, topic: impl Into<String>) -> TopicSubscription {
        let topic = topic.into();
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.buffer);

        self.topics
            .write()
            .unwrap()
            .entry(topic.clone())
            .or_default()
            .insert(conn_id, tx);

        debug!(topic = %topic, conn_id, "Subscriber registered");

        TopicSubscription {
            topic,
            conn_id,
            rx,
            registry: Arc::clone(&self.topics),
        }
    }

    /// Publish a record to every connection currently registered under `topic`.
    ///
    /// Returns the number of connections the message was handed to. Zero
    /// subscribers means the message is dropped - there is no buffering or
    /// replay, and the caller gets no error channel. A connection whose
    /// buffer is full is skipped (publish never blocks on a slow subscriber);
    /// closed connections are pruned.
    pub fn publish(&self, topic: &str, record: &StateRecord) -> usize {
        let mut delivered = 0;
        let mut stale = Vec::new();

        {
            let topics = self.topics.read().unwrap();
            let Some(connections) = topics.get(topic) else {
                debug!(topic = %topic, "No subscribers at publish time, notification dropped");
                return 0;
            };

            let message = NotificationMessage {
                topic: topic.to_string(),
                record: record.clone(),
            };

            for (&conn_id, tx) in connections {
                match tx.try_send(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(topic = %topic, conn_id, "Subscriber buffer full, dropping notification");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        stale.push(conn_id);
                    }
                }
            }
        }

        for conn_id in stale {
            remove_connection(&self.topics, topic, conn_id);
        }

        debug!(topic = %topic, delivered, "Published notification");
        delivered
    }

    /// Number of live connections on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .unwrap()
            .get(topic)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    /// Drop every registered sender, closing all subscriber channels.
    ///
    /// Used during graceful shutdown: forwarding loops observe the close and
    /// tear their connections down.
    pub fn shutdown_all(&self) {
        let mut topics = self.topics.write().unwrap();
        let count: usize = topics.values().map(|c| c.len()).sum();
        topics.clear();
        info!(count, "Closed all hub subscriptions");
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTION_BUFFER)
    }
}

impl NotificationPublisher for NotificationHub {
    fn publish(&self, topic: &str, record: &StateRecord) {
        NotificationHub::publish(self, topic, record);
    }
}

/// A live subscription on a topic.
///
/// Receives every record published on the topic while the handle is alive.
/// Dropping the handle removes the registration; by convention the consumer
/// drops it after the first message (single-shot protocol), but the hub does
/// not enforce that.
pub struct TopicSubscription {
    topic: String,
    conn_id: ConnectionId,
    rx: mpsc::Receiver<NotificationMessage>,
    registry: Arc<RwLock<TopicRegistry>>,
}

impl TopicSubscription {
    /// Wait for the next notification. `None` once the hub has shut down.
    pub async fn recv(&mut self) -> Option<NotificationMessage> {
        self.rx.recv().await
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Drop for TopicSubscription {
    fn drop(&mut self) {
        remove_connection(&self.registry, &self.topic, self.conn_id);
        debug!(topic = %self.topic, conn_id = self.conn_id, "Subscriber deregistered");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use offload_core::domain::{JobState, StateRecord};
    use std::time::Duration;

    fn record(id: &str, state: JobState) -> StateRecord {
        StateRecord {
            message_id: id.to_string(),
            job_type: 1,
            state,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_record() {
        let hub = NotificationHub::default();
        let mut sub = hub.subscribe("abc123");

        let delivered = hub.publish("abc123", &record("abc123", JobState::Done));
        assert_eq!(delivered, 1);

        let msg = sub.recv().await.expect("should receive the notification");
        assert_eq!(msg.topic, "abc123");
        assert_eq!(msg.record.message_id, "abc123");
        assert_eq!(msg.record.state, JobState::Done);
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_dropped_silently() {
        let hub = NotificationHub::default();
        // No subscribers - this must neither panic nor block.
        let delivered = hub.publish("orphan", &record("orphan", JobState::Done));
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn late_subscriber_misses_the_publish() {
        let hub = NotificationHub::default();
        hub.publish("abc123", &record("abc123", JobState::Done));

        let mut sub = hub.subscribe("abc123");
        let result = tokio::time::timeout(Duration::from_millis(50), sub.recv()).await;
        assert!(result.is_err(), "no replay for late subscribers");
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let hub = NotificationHub::default();
        let mut sub_a = hub.subscribe("topic-a");
        let mut sub_b = hub.subscribe("topic-b");

        hub.publish("topic-b", &record("b-1", JobState::Done));

        let b_msg = sub_b.recv().await.unwrap();
        assert_eq!(b_msg.record.message_id, "b-1");

        let a_result = tokio::time::timeout(Duration::from_millis(50), sub_a.recv()).await;
        assert!(a_result.is_err(), "topic A must not see topic B publishes");
    }

    #[tokio::test]
    async fn multiple_subscribers_on_one_topic_all_receive() {
        let hub = NotificationHub::default();
        let mut sub1 = hub.subscribe("shared");
        let mut sub2 = hub.subscribe("shared");

        let delivered = hub.publish("shared", &record("shared", JobState::Done));
        assert_eq!(delivered, 2);

        assert!(sub1.recv().await.is_some());
        assert!(sub2.recv().await.is_some());
    }

    #[tokio::test]
    async fn dropping_subscription_deregisters_it() {
        let hub = NotificationHub::default();
        let sub = hub.subscribe("abc123");
        assert_eq!(hub.subscriber_count("abc123"), 1);

        drop(sub);
        assert_eq!(hub.subscriber_count("abc123"), 0);

        // Registry entry for the topic is gone entirely.
        let delivered = hub.publish("abc123", &record("abc123", JobState::Done));
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn full_buffer_drops_instead_of_blocking() {
        let hub = NotificationHub::new(2);
        let mut sub = hub.subscribe("busy");

        let rec = record("busy", JobState::Done);
        assert_eq!(hub.publish("busy", &rec), 1);
        assert_eq!(hub.publish("busy", &rec), 1);
        // Buffer of 2 is full; the third publish drops for this connection.
        assert_eq!(hub.publish("busy", &rec), 0);

        // The two buffered messages are still readable.
        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_some());
    }

    #[tokio::test]
    async fn shutdown_closes_subscriber_channels() {
        let hub = NotificationHub::default();
        let mut sub = hub.subscribe("abc123");

        hub.shutdown_all();
        assert!(sub.recv().await.is_none(), "channel closes on shutdown");
        assert_eq!(hub.subscriber_count("abc123"), 0);
    }

    #[tokio::test]
    async fn publish_prunes_closed_connections() {
        let hub = NotificationHub::default();
        let mut sub = hub.subscribe("abc123");

        // Close the receiving end without dropping the registration.
        sub.rx.close();
        assert_eq!(hub.subscriber_count("abc123"), 1);

        let delivered = hub.publish("abc123", &record("abc123", JobState::Done));
        assert_eq!(delivered, 0);
        assert_eq!(hub.subscriber_count("abc123"), 0, "closed connection pruned");
    }
}
