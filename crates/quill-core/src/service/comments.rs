//! Comment creation and threading, wired to the fan-out broker.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::Comment;
use crate::error::DomainError;
use crate::ports::{
    BaseRepository, CommentEvent, CommentFanout, CommentRepository, PostRepository, UserRepository,
};

/// A comment with its replies, author resolved to a display name.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    pub id: Uuid,
    pub author: String,
    pub body: String,
    pub parent_id: Option<Uuid>,
    pub created_date: DateTime<Utc>,
    pub replies: Vec<CommentThread>,
}

#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
    fanout: Arc<dyn CommentFanout>,
}

impl CommentService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
        fanout: Arc<dyn CommentFanout>,
    ) -> Self {
        Self {
            posts,
            comments,
            users,
            fanout,
        }
    }

    /// Persist a comment, then push it to every live viewer of the post.
    ///
    /// The publish happens strictly after the store commit, once per
    /// comment, so per-post delivery order matches commit order. Delivery
    /// itself is best-effort.
    pub async fn create(
        &self,
        post_slug: &str,
        author_id: Uuid,
        body: String,
        parent_id: Option<Uuid>,
    ) -> Result<Comment, DomainError> {
        if body.trim().is_empty() {
            return Err(DomainError::Validation(
                "comment body must not be empty".to_string(),
            ));
        }

        let post = self
            .posts
            .find_by_slug(post_slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post '{post_slug}'")))?;

        let comment = Comment::new(post.id, author_id, body, parent_id);
        let saved = self.comments.insert(comment).await?;

        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| "unknown".to_string());

        let event = CommentEvent {
            author,
            body: saved.body.clone(),
            created_date: saved.created_date,
        };
        self.fanout.publish(post.id, &event).await;

        Ok(saved)
    }

    /// Arrange a post's comments into threads: top-level comments in
    /// chronological order, each carrying its replies recursively.
    pub fn thread(comments: Vec<Comment>, authors: &HashMap<Uuid, String>) -> Vec<CommentThread> {
        let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        let mut roots = Vec::new();
        for comment in comments {
            match comment.parent_id {
                Some(parent) => children.entry(parent).or_default().push(comment),
                None => roots.push(comment),
            }
        }

        fn build(
            comment: Comment,
            children: &mut HashMap<Uuid, Vec<Comment>>,
            authors: &HashMap<Uuid, String>,
        ) -> CommentThread {
            let replies = children
                .remove(&comment.id)
                .unwrap_or_default()
                .into_iter()
                .map(|reply| build(reply, children, authors))
                .collect();
            CommentThread {
                id: comment.id,
                author: authors
                    .get(&comment.author_id)
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                body: comment.body,
                parent_id: comment.parent_id,
                created_date: comment.created_date,
                replies,
            }
        }

        roots
            .into_iter()
            .map(|root| build(root, &mut children, authors))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_nest_replies_under_parents() {
        let post_id = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let top = Comment::new(post_id, alice, "first".into(), None);
        let reply = Comment::new(post_id, bob, "reply".into(), Some(top.id));
        let nested = Comment::new(post_id, alice, "deeper".into(), Some(reply.id));
        let other = Comment::new(post_id, bob, "second".into(), None);

        let authors = HashMap::from([(alice, "alice".to_string()), (bob, "bob".to_string())]);
        let threads = CommentService::thread(vec![top, reply, nested, other], &authors);

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].author, "alice");
        assert_eq!(threads[0].replies.len(), 1);
        assert_eq!(threads[0].replies[0].body, "reply");
        // the model nests recursively even though the UI renders one level
        assert_eq!(threads[0].replies[0].replies[0].body, "deeper");
        assert!(threads[1].replies.is_empty());
    }
}
