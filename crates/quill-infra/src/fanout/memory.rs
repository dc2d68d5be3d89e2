//! In-memory fan-out broker.
//!
//! Owns the post-id → viewer-group map. Works within a single process; the
//! Redis bridge builds on it for multi-process deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::ports::{CommentEvent, CommentFanout, Recipient};

type Group = Arc<RwLock<HashMap<Uuid, Arc<dyn Recipient>>>>;

/// Each group carries its own lock; the outer map lock is held only for
/// map access. Lock order is always outer map, then group. Delivery
/// happens outside both, so a slow recipient on one post cannot stall
/// membership changes anywhere.
pub struct InMemoryFanout {
    groups: RwLock<HashMap<Uuid, Group>>,
}

impl InMemoryFanout {
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Whether the post currently has any live viewers.
    pub async fn has_members(&self, post_id: Uuid) -> bool {
        match self.groups.read().await.get(&post_id) {
            Some(group) => !group.read().await.is_empty(),
            None => false,
        }
    }

    /// Snapshot the group, then push outside the locks.
    pub(crate) async fn deliver(&self, post_id: Uuid, event: &CommentEvent) {
        let group = self.groups.read().await.get(&post_id).cloned();
        let Some(group) = group else {
            tracing::debug!(post_id = %post_id, "No viewers for post");
            return;
        };

        let members: Vec<Arc<dyn Recipient>> = group.read().await.values().cloned().collect();
        let mut missed = 0usize;
        for recipient in &members {
            if !recipient.deliver(event) {
                missed += 1;
            }
        }
        // missed deliveries are final: no queueing, no retry
        tracing::debug!(
            post_id = %post_id,
            delivered = members.len() - missed,
            missed,
            "Comment fanned out"
        );
    }

    /// Drop the group if it is empty. Membership is re-checked under the
    /// outer write lock so a concurrent join is never lost.
    async fn reclaim_if_empty(&self, post_id: Uuid) {
        let mut groups = self.groups.write().await;
        if let Some(group) = groups.get(&post_id) {
            if group.read().await.is_empty() {
                groups.remove(&post_id);
                tracing::debug!(post_id = %post_id, "Reclaimed empty viewer group");
            }
        }
    }
}

impl Default for InMemoryFanout {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommentFanout for InMemoryFanout {
    async fn join(&self, post_id: Uuid, recipient: Arc<dyn Recipient>) {
        // insert while holding the outer write lock, so a racing reclaim
        // cannot drop the group between lookup and insert
        let mut groups = self.groups.write().await;
        let group = groups.entry(post_id).or_default().clone();
        let mut members = group.write().await;
        let recipient_id = recipient.id();
        if members.insert(recipient_id, recipient).is_none() {
            tracing::debug!(post_id = %post_id, recipient_id = %recipient_id, "Viewer joined post group");
        }
    }

    async fn leave(&self, post_id: Uuid, recipient_id: Uuid) {
        let group = self.groups.read().await.get(&post_id).cloned();
        let Some(group) = group else { return };

        let emptied = {
            let mut members = group.write().await;
            members.remove(&recipient_id);
            members.is_empty()
        };
        tracing::debug!(post_id = %post_id, recipient_id = %recipient_id, "Viewer left post group");

        if emptied {
            self.reclaim_if_empty(post_id).await;
        }
    }

    async fn drop_connection(&self, recipient_id: Uuid) {
        let groups: Vec<(Uuid, Group)> = self
            .groups
            .read()
            .await
            .iter()
            .map(|(post_id, group)| (*post_id, group.clone()))
            .collect();

        let mut emptied = Vec::new();
        for (post_id, group) in groups {
            let mut members = group.write().await;
            if members.remove(&recipient_id).is_some() && members.is_empty() {
                emptied.push(post_id);
            }
        }
        for post_id in emptied {
            self.reclaim_if_empty(post_id).await;
        }
    }

    async fn publish(&self, post_id: Uuid, event: &CommentEvent) {
        self.deliver(post_id, event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    struct TestRecipient {
        id: Uuid,
        received: Mutex<Vec<CommentEvent>>,
        accept: bool,
    }

    impl TestRecipient {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                id: Uuid::new_v4(),
                received: Mutex::new(Vec::new()),
                accept: true,
            })
        }

        fn broken() -> Arc<Self> {
            Arc::new(Self {
                id: Uuid::new_v4(),
                received: Mutex::new(Vec::new()),
                accept: false,
            })
        }

        fn count(&self) -> usize {
            self.received.lock().unwrap().len()
        }
    }

    impl Recipient for TestRecipient {
        fn id(&self) -> Uuid {
            self.id
        }

        fn deliver(&self, event: &CommentEvent) -> bool {
            if self.accept {
                self.received.lock().unwrap().push(event.clone());
            }
            self.accept
        }
    }

    fn event(body: &str) -> CommentEvent {
        CommentEvent {
            author: "alice".into(),
            body: body.into(),
            created_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_member() {
        let fanout = InMemoryFanout::new();
        let post_id = Uuid::new_v4();
        let (a, b) = (TestRecipient::new(), TestRecipient::new());

        fanout.join(post_id, a.clone()).await;
        fanout.join(post_id, b.clone()).await;
        fanout.publish(post_id, &event("hello")).await;

        assert_eq!(a.count(), 1);
        assert_eq!(b.count(), 1);
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let fanout = InMemoryFanout::new();
        let post_id = Uuid::new_v4();
        let viewer = TestRecipient::new();

        fanout.join(post_id, viewer.clone()).await;
        fanout.join(post_id, viewer.clone()).await;
        fanout.publish(post_id, &event("once")).await;

        assert_eq!(viewer.count(), 1);
    }

    #[tokio::test]
    async fn leave_stops_delivery_and_reclaims_group() {
        let fanout = InMemoryFanout::new();
        let post_id = Uuid::new_v4();
        let viewer = TestRecipient::new();

        fanout.join(post_id, viewer.clone()).await;
        fanout.leave(post_id, viewer.id()).await;
        fanout.publish(post_id, &event("missed")).await;

        assert_eq!(viewer.count(), 0);
        assert!(!fanout.has_members(post_id).await);
        assert!(fanout.groups.read().await.is_empty());
    }

    #[tokio::test]
    async fn groups_are_isolated_per_post() {
        let fanout = InMemoryFanout::new();
        let (post_a, post_b) = (Uuid::new_v4(), Uuid::new_v4());
        let (viewer_a, viewer_b) = (TestRecipient::new(), TestRecipient::new());

        fanout.join(post_a, viewer_a.clone()).await;
        fanout.join(post_b, viewer_b.clone()).await;
        fanout.publish(post_a, &event("only a")).await;

        assert_eq!(viewer_a.count(), 1);
        assert_eq!(viewer_b.count(), 0);
    }

    #[tokio::test]
    async fn failed_delivery_is_silent_and_isolated() {
        let fanout = InMemoryFanout::new();
        let post_id = Uuid::new_v4();
        let (healthy, broken) = (TestRecipient::new(), TestRecipient::broken());

        fanout.join(post_id, healthy.clone()).await;
        fanout.join(post_id, broken).await;
        fanout.publish(post_id, &event("best effort")).await;

        assert_eq!(healthy.count(), 1);
    }

    #[tokio::test]
    async fn drop_connection_leaves_every_group() {
        let fanout = InMemoryFanout::new();
        let (post_a, post_b) = (Uuid::new_v4(), Uuid::new_v4());
        let viewer = TestRecipient::new();

        fanout.join(post_a, viewer.clone()).await;
        fanout.join(post_b, viewer.clone()).await;
        fanout.drop_connection(viewer.id()).await;

        fanout.publish(post_a, &event("gone")).await;
        fanout.publish(post_b, &event("gone")).await;

        assert_eq!(viewer.count(), 0);
        assert!(fanout.groups.read().await.is_empty());
    }
}
