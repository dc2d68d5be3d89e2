//! Like toggle service.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{DomainError, RepoError};
use crate::ports::{LikeRepository, PostRepository};

/// Result of a toggle: the new state and the persisted like count.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub count: u64,
}

#[derive(Clone)]
pub struct LikeService {
    posts: Arc<dyn PostRepository>,
    likes: Arc<dyn LikeRepository>,
}

impl LikeService {
    pub fn new(posts: Arc<dyn PostRepository>, likes: Arc<dyn LikeRepository>) -> Self {
        Self { posts, likes }
    }

    /// Flip the (post, user) like and return the state that actually
    /// persisted, with a freshly recomputed count.
    pub async fn toggle(&self, post_slug: &str, user_id: Uuid) -> Result<LikeOutcome, DomainError> {
        let post = self
            .posts
            .find_by_slug(post_slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post '{post_slug}'")))?;

        let liked = self.toggle_pair(post.id, user_id).await?;
        let count = self.likes.count_for_post(post.id).await?;
        Ok(LikeOutcome { liked, count })
    }

    /// Read-modify-write against the unique (post, user) key. The store's
    /// uniqueness constraint is the safety net: a racing duplicate insert
    /// fails closed and a racing delete reports NotFound, and either way we
    /// re-read and apply the toggle on top of whatever won. Concurrent
    /// toggles from different users never contend.
    async fn toggle_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        loop {
            if self.likes.exists(post_id, user_id).await? {
                match self.likes.remove(post_id, user_id).await {
                    Ok(()) => return Ok(false),
                    Err(RepoError::NotFound) => continue,
                    Err(e) => return Err(e.into()),
                }
            } else {
                match self.likes.insert(post_id, user_id).await {
                    Ok(()) => return Ok(true),
                    Err(RepoError::Constraint(_)) => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }
}
