//! Post operations: authoring, listing, and the entitlement-gated view.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{AccessLevel, Post, PostStatus, Role};
use crate::entitlement;
use crate::error::DomainError;
use crate::ports::{
    BaseRepository, CommentRepository, LikeRepository, PostRepository, UserRepository,
};
use crate::service::comments::{CommentService, CommentThread};

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub access_level: AccessLevel,
    pub status: PostStatus,
}

/// Partial update; `None` leaves a field unchanged. The slug never changes
/// after creation.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub access_level: Option<AccessLevel>,
    pub status: Option<PostStatus>,
}

/// Everything the detail page needs, body already entitlement-filtered.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub body: String,
    pub paywalled: bool,
    pub comments: Vec<CommentThread>,
    pub like_count: u64,
    pub liked_by_viewer: bool,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn LikeRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        likes: Arc<dyn LikeRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            posts,
            comments,
            likes,
            users,
        }
    }

    /// Create a post. Only authors and admins may publish.
    pub async fn create(
        &self,
        author_id: Uuid,
        role: Role,
        new_post: NewPost,
    ) -> Result<Post, DomainError> {
        if !role.can_publish() {
            return Err(DomainError::Forbidden);
        }
        if new_post.title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".into()));
        }
        if new_post.body.trim().is_empty() {
            return Err(DomainError::Validation("body must not be empty".into()));
        }

        let mut post = Post::new(author_id, new_post.title, new_post.body);
        post.category = new_post.category;
        post.tags = normalize_tags(new_post.tags);
        post.access_level = new_post.access_level;
        post.status = new_post.status;

        Ok(self.posts.insert(post).await?)
    }

    /// Update a post. Only its author may mutate it.
    pub async fn update(
        &self,
        slug: &str,
        actor_id: Uuid,
        update: PostUpdate,
    ) -> Result<Post, DomainError> {
        let mut post = self.require(slug).await?;
        if post.author_id != actor_id {
            return Err(DomainError::Forbidden);
        }

        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(DomainError::Validation("title must not be empty".into()));
            }
            post.title = title;
        }
        if let Some(body) = update.body {
            if body.trim().is_empty() {
                return Err(DomainError::Validation("body must not be empty".into()));
            }
            post.body = body;
        }
        if let Some(category) = update.category {
            post.category = Some(category);
        }
        if let Some(tags) = update.tags {
            post.tags = normalize_tags(tags);
        }
        if let Some(access_level) = update.access_level {
            post.access_level = access_level;
        }
        if let Some(status) = update.status {
            post.status = status;
        }
        post.updated_at = chrono::Utc::now();

        Ok(self.posts.save(post).await?)
    }

    /// Delete a post and, with it, its comments and likes. Author only.
    pub async fn delete(&self, slug: &str, actor_id: Uuid) -> Result<(), DomainError> {
        let post = self.require(slug).await?;
        if post.author_id != actor_id {
            return Err(DomainError::Forbidden);
        }
        Ok(self.posts.delete(post.id).await?)
    }

    /// Published posts, newest first.
    pub async fn list(&self, page: u64, per_page: u64) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_published(page.max(1), per_page).await?)
    }

    /// Fetch a post for display: counts the view, resolves entitlement,
    /// and assembles the comment threads.
    ///
    /// Drafts exist only for their author; everyone else gets NotFound.
    pub async fn view(
        &self,
        slug: &str,
        viewer_id: Uuid,
        viewer_is_premium: bool,
    ) -> Result<PostView, DomainError> {
        let mut post = self.require(slug).await?;
        if post.status == PostStatus::Draft && post.author_id != viewer_id {
            return Err(DomainError::NotFound(format!("post '{slug}'")));
        }

        self.posts.increment_view_count(post.id).await?;
        post.view_count += 1;

        let rendering = entitlement::render_body(&post, viewer_id, viewer_is_premium);

        let comments = self.comments.list_for_post(post.id).await?;
        let authors = self.resolve_authors(&comments).await?;
        let threads = CommentService::thread(comments, &authors);

        let like_count = self.likes.count_for_post(post.id).await?;
        let liked_by_viewer = self.likes.exists(post.id, viewer_id).await?;

        Ok(PostView {
            post,
            body: rendering.body,
            paywalled: rendering.paywalled,
            comments: threads,
            like_count,
            liked_by_viewer,
        })
    }

    async fn require(&self, slug: &str) -> Result<Post, DomainError> {
        self.posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post '{slug}'")))
    }

    async fn resolve_authors(
        &self,
        comments: &[crate::domain::Comment],
    ) -> Result<HashMap<Uuid, String>, DomainError> {
        let mut authors = HashMap::new();
        for comment in comments {
            if authors.contains_key(&comment.author_id) {
                continue;
            }
            if let Some(user) = self.users.find_by_id(comment.author_id).await? {
                authors.insert(comment.author_id, user.username);
            }
        }
        Ok(authors)
    }
}

/// Trim, drop empties, and de-duplicate while keeping first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = normalize_tags(vec![
            " rust ".into(),
            "Rust".into(),
            String::new(),
            "tokio".into(),
        ]);
        assert_eq!(tags, vec!["rust".to_string(), "tokio".to_string()]);
    }
}
