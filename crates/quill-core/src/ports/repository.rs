use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, Profile, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Profile repository - one profile per user, keyed by the user id.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError>;

    /// Upsert: the profile either exists from registration or is created on
    /// first write.
    async fn save(&self, profile: Profile) -> Result<Profile, RepoError>;
}

/// Post repository.
///
/// `delete` (from [`BaseRepository`]) cascades: the post's comments and
/// likes go with it, leaving no dangling references.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Insert a new post. Fails with [`RepoError::SlugConflict`] when
    /// another post already uses the slug on the same publish date.
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Published posts, newest publish date first. Pages are 1-based.
    async fn list_published(&self, page: u64, per_page: u64) -> Result<Vec<Post>, RepoError>;

    async fn increment_view_count(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment. A parent reference is validated at the storage
    /// boundary: it must exist and belong to the same post, otherwise
    /// [`RepoError::InvalidParent`] and nothing is written.
    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError>;

    /// All comments on a post, chronological ascending.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// Like repository - existence of (post, user) pairs under a hard
/// uniqueness constraint.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn exists(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    /// Insert the pair. A duplicate fails closed with
    /// [`RepoError::Constraint`]; it never creates a second row.
    async fn insert(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError>;

    /// Remove the pair; [`RepoError::NotFound`] when it was not present.
    async fn remove(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError>;

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}
