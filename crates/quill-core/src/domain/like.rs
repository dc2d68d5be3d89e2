use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Like entity - pure existence of a (post, user) pair.
///
/// At most one row may exist per pair; the store enforces this with a
/// uniqueness constraint rather than a check-then-insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
}

impl Like {
    pub fn new(post_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
        }
    }
}
