use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - chronological within a post, optionally threaded.
///
/// A comment with a parent must reference a parent on the same post; the
/// store rejects the insert otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub parent_id: Option<Uuid>,
    pub created_date: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, body: String, parent_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            body,
            parent_id,
            created_date: Utc::now(),
        }
    }
}
