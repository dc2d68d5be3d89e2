//! Fan-out broker port - live distribution of new comments to the viewers
//! of a post.
//!
//! Delivery is best-effort and at-most-once: there is no queueing, no
//! retry, no replay for viewers who join late or drop. By the same token
//! the broker has no error channel - a failed delivery is simply a missed
//! message, which operators should know when reading logs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload pushed to every member of a post's group once a comment write
/// has committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEvent {
    pub author: String,
    pub body: String,
    pub created_date: DateTime<Utc>,
}

/// Name of the logical channel carrying a post's comment events. Keyed by
/// post id: slugs are only unique per publish day.
pub fn comment_channel(post_id: Uuid) -> String {
    format!("comments_{post_id}")
}

/// A live viewer connection.
///
/// `deliver` must not block; a `false` return means the recipient missed
/// the event, and nobody will retry.
pub trait Recipient: Send + Sync {
    fn id(&self) -> Uuid;

    fn deliver(&self, event: &CommentEvent) -> bool;
}

/// The broker owning per-post groups of live connections.
#[async_trait]
pub trait CommentFanout: Send + Sync {
    /// Add a connection to the post's group. No-op if already a member.
    async fn join(&self, post_id: Uuid, recipient: Arc<dyn Recipient>);

    /// Remove a connection from the post's group. An empty group may be
    /// reclaimed.
    async fn leave(&self, post_id: Uuid, recipient_id: Uuid);

    /// Remove a connection from every group it joined. Called on transport
    /// teardown; must not block any in-flight publish.
    async fn drop_connection(&self, recipient_id: Uuid);

    /// Deliver the event to every connection currently in the post's
    /// group. Per-post ordering follows the order of calls; nothing is
    /// guaranteed across posts.
    async fn publish(&self, post_id: Uuid, event: &CommentEvent);
}
