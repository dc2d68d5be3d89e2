//! Redis-bridged fan-out broker.
//!
//! Publishes go through one Redis channel per post (`comments_<postID>`)
//! and come back to every process, which then delivers to its local
//! viewers. Best-effort semantics are unchanged: Redis pub/sub keeps no
//! history, so a process that is down simply misses messages.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::ports::{CommentEvent, CommentFanout, Recipient, comment_channel};

use super::InMemoryFanout;

/// Redis connection settings for the fan-out bridge.
#[derive(Debug, Clone)]
pub struct RedisFanoutConfig {
    pub url: String,
    pub connect_timeout: Duration,
}

impl RedisFanoutConfig {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}

/// Errors raised while setting the bridge up. Publish and membership
/// operations stay error-free like the port demands; transport failures
/// there are logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum RedisFanoutError {
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Redis bridge over the in-memory broker: membership is process-local,
/// events travel through Redis so every process fans out to its own
/// viewers.
pub struct RedisFanout {
    conn: ConnectionManager,
    client: Client,
    local: Arc<InMemoryFanout>,
    subscriptions: Arc<RwLock<HashMap<Uuid, tokio::task::JoinHandle<()>>>>,
}

impl RedisFanout {
    pub async fn new(config: RedisFanoutConfig) -> Result<Self, RedisFanoutError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| RedisFanoutError::Connection(e.to_string()))?;

        // Bound the wait so a dead Redis does not hang startup
        let conn_manager_fut = ConnectionManager::new(client.clone());
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| RedisFanoutError::Connection("Connection timed out".to_string()))?
            .map_err(|e| RedisFanoutError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis fan-out bridge");

        Ok(Self {
            conn,
            client,
            local: Arc::new(InMemoryFanout::new()),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub async fn from_env() -> Result<Self, RedisFanoutError> {
        Self::new(RedisFanoutConfig::from_env()).await
    }

    /// Start the Redis subscriber for a post's channel if none runs yet.
    async fn ensure_subscribed(&self, post_id: Uuid) {
        if self.subscriptions.read().await.contains_key(&post_id) {
            return;
        }
        let mut subscriptions = self.subscriptions.write().await;
        if subscriptions.contains_key(&post_id) {
            return;
        }

        let client = self.client.clone();
        let local = self.local.clone();
        let channel = comment_channel(post_id);

        let handle = tokio::spawn(async move {
            let mut pubsub = match client.get_async_pubsub().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to get pubsub connection");
                    return;
                }
            };
            if let Err(e) = pubsub.subscribe(&channel).await {
                tracing::error!(channel = %channel, error = %e, "Failed to subscribe");
                return;
            }
            tracing::debug!(channel = %channel, "Subscribed to Redis channel");

            let mut stream = pubsub.on_message();
            while let Some(msg) = stream.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to get message payload");
                        continue;
                    }
                };
                match serde_json::from_str::<CommentEvent>(&payload) {
                    Ok(event) => local.deliver(post_id, &event).await,
                    Err(e) => {
                        tracing::warn!(channel = %channel, error = %e, "Malformed comment event")
                    }
                }
            }

            tracing::info!(channel = %channel, "Redis channel closed");
        });

        subscriptions.insert(post_id, handle);
    }

    /// Stop the subscriber once the last local viewer is gone.
    async fn prune_subscription(&self, post_id: Uuid) {
        if self.local.has_members(post_id).await {
            return;
        }
        if let Some(handle) = self.subscriptions.write().await.remove(&post_id) {
            handle.abort();
            tracing::debug!(post_id = %post_id, "Unsubscribed from Redis channel");
        }
    }
}

#[async_trait]
impl CommentFanout for RedisFanout {
    async fn join(&self, post_id: Uuid, recipient: Arc<dyn Recipient>) {
        self.ensure_subscribed(post_id).await;
        self.local.join(post_id, recipient).await;
    }

    async fn leave(&self, post_id: Uuid, recipient_id: Uuid) {
        self.local.leave(post_id, recipient_id).await;
        self.prune_subscription(post_id).await;
    }

    async fn drop_connection(&self, recipient_id: Uuid) {
        self.local.drop_connection(recipient_id).await;
        let subscribed: Vec<Uuid> = self.subscriptions.read().await.keys().copied().collect();
        for post_id in subscribed {
            self.prune_subscription(post_id).await;
        }
    }

    /// Fire-and-forget into Redis; local delivery happens when the message
    /// loops back through the subscriber, exactly once per process.
    async fn publish(&self, post_id: Uuid, event: &CommentEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode comment event");
                return;
            }
        };
        let mut conn = self.conn.clone();
        if let Err(e) = conn
            .publish::<_, _, ()>(comment_channel(post_id), payload)
            .await
        {
            tracing::warn!(post_id = %post_id, error = %e, "Redis publish failed; viewers miss this event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use std::time::Duration;

    struct TestRecipient {
        id: Uuid,
        received: Mutex<Vec<CommentEvent>>,
    }

    impl Recipient for TestRecipient {
        fn id(&self) -> Uuid {
            self.id
        }

        fn deliver(&self, event: &CommentEvent) -> bool {
            self.received.lock().unwrap().push(event.clone());
            true
        }
    }

    async fn get_test_fanout() -> Option<RedisFanout> {
        let config = RedisFanoutConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
        };
        RedisFanout::new(config).await.ok()
    }

    // Runs only when a Redis instance is reachable.
    #[tokio::test]
    async fn round_trip_through_redis() {
        let Some(fanout) = get_test_fanout().await else {
            return;
        };

        let post_id = Uuid::new_v4();
        let viewer = Arc::new(TestRecipient {
            id: Uuid::new_v4(),
            received: Mutex::new(Vec::new()),
        });

        fanout.join(post_id, viewer.clone()).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let event = CommentEvent {
            author: "alice".into(),
            body: "via redis".into(),
            created_date: Utc::now(),
        };
        fanout.publish(post_id, &event).await;
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(viewer.received.lock().unwrap().len(), 1);
        fanout.leave(post_id, viewer.id()).await;
    }
}
