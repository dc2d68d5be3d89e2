//! In-memory engagement store.
//!
//! Default store when Postgres is not configured; also what the service
//! tests run against. Single process only, contents lost on restart. All
//! storage-boundary invariants (like uniqueness, cascade delete, parent
//! validation, per-day slug uniqueness) are enforced here exactly as the
//! Postgres store enforces them.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, PostStatus, Profile, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CommentRepository, LikeRepository, PostRepository, ProfileRepository,
    UserRepository,
};

/// One struct backs every repository port so cascade deletes stay atomic.
///
/// Lock order when several tables are touched: posts, comments, likes.
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    profiles: RwLock<HashMap<Uuid, Profile>>,
    posts: RwLock<HashMap<Uuid, Post>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
    // One set entry per user per post: the uniqueness constraint is
    // structural, a duplicate insert cannot produce a second row.
    likes: Mutex<HashMap<Uuid, BTreeSet<Uuid>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            profiles: RwLock::new(HashMap::new()),
            posts: RwLock::new(HashMap::new()),
            comments: RwLock::new(HashMap::new()),
            likes: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.users.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn save(&self, profile: Profile) -> Result<Profile, RepoError> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id, profile.clone());
        Ok(profile)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    /// Cascade: the post's comments and likes are removed with it.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        if posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        let mut comments = self.comments.write().await;
        comments.retain(|_, c| c.post_id != id);
        self.likes.lock().await.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let publish_day = post.publish_date.date_naive();
        let conflict = posts
            .values()
            .any(|p| p.slug == post.slug && p.publish_date.date_naive() == publish_day);
        if conflict {
            return Err(RepoError::SlugConflict);
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self
            .posts
            .read()
            .await
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn list_published(&self, page: u64, per_page: u64) -> Result<Vec<Post>, RepoError> {
        let mut published: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.status == PostStatus::Published)
            .cloned()
            .collect();
        published.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));

        let offset = (page.saturating_sub(1) * per_page) as usize;
        Ok(published
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect())
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<(), RepoError> {
        match self.posts.write().await.get_mut(&id) {
            Some(post) => {
                post.view_count += 1;
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.comments.write().await;
        if let Some(parent_id) = comment.parent_id {
            match comments.get(&parent_id) {
                Some(parent) if parent.post_id == comment.post_id => {}
                // missing parent or parent on another post: nothing written
                _ => return Err(RepoError::InvalidParent),
            }
        }
        comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.comments.read().await.get(&id).cloned())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let mut list: Vec<Comment> = self
            .comments
            .read()
            .await
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.created_date.cmp(&b.created_date));
        Ok(list)
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn exists(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        Ok(self
            .likes
            .lock()
            .await
            .get(&post_id)
            .is_some_and(|set| set.contains(&user_id)))
    }

    async fn insert(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        let mut likes = self.likes.lock().await;
        let set = likes.entry(post_id).or_default();
        if !set.insert(user_id) {
            return Err(RepoError::Constraint("like already exists".to_string()));
        }
        Ok(())
    }

    async fn remove(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        let mut likes = self.likes.lock().await;
        let removed = likes
            .get_mut(&post_id)
            .is_some_and(|set| set.remove(&user_id));
        if !removed {
            return Err(RepoError::NotFound);
        }
        if likes.get(&post_id).is_some_and(|set| set.is_empty()) {
            likes.remove(&post_id);
        }
        Ok(())
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        Ok(self
            .likes
            .lock()
            .await
            .get(&post_id)
            .map_or(0, |set| set.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::Role;

    fn post(author_id: Uuid, title: &str) -> Post {
        Post::new(author_id, title.into(), "body".into())
    }

    #[tokio::test]
    async fn duplicate_like_fails_closed() {
        let store = InMemoryStore::new();
        let (post_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());

        LikeRepository::insert(&store, post_id, user_id)
            .await
            .unwrap();
        let second = LikeRepository::insert(&store, post_id, user_id).await;

        assert!(matches!(second, Err(RepoError::Constraint(_))));
        assert_eq!(store.count_for_post(post_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_post_cascades_to_comments_and_likes() {
        let store = InMemoryStore::new();
        let author = Uuid::new_v4();
        let post = PostRepository::insert(&store, post(author, "Cascade")).await.unwrap();

        let comment = Comment::new(post.id, author, "hello".into(), None);
        let comment = CommentRepository::insert(&store, comment).await.unwrap();
        LikeRepository::insert(&store, post.id, author).await.unwrap();

        BaseRepository::<Post, Uuid>::delete(&store, post.id)
            .await
            .unwrap();

        assert!(store.find_by_slug("cascade").await.unwrap().is_none());
        assert!(
            CommentRepository::find_by_id(&store, comment.id)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(store.count_for_post(post.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn parent_on_another_post_is_rejected() {
        let store = InMemoryStore::new();
        let author = Uuid::new_v4();
        let first = PostRepository::insert(&store, post(author, "First")).await.unwrap();
        let second = PostRepository::insert(&store, post(author, "Second")).await.unwrap();

        let parent = Comment::new(first.id, author, "on first".into(), None);
        let parent = CommentRepository::insert(&store, parent).await.unwrap();

        let stray = Comment::new(second.id, author, "wrong thread".into(), Some(parent.id));
        let result = CommentRepository::insert(&store, stray).await;

        assert!(matches!(result, Err(RepoError::InvalidParent)));
        assert!(store.list_for_post(second.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_parent_is_rejected() {
        let store = InMemoryStore::new();
        let author = Uuid::new_v4();
        let post = PostRepository::insert(&store, post(author, "Lonely")).await.unwrap();

        let orphan = Comment::new(post.id, author, "no parent".into(), Some(Uuid::new_v4()));
        let result = CommentRepository::insert(&store, orphan).await;

        assert!(matches!(result, Err(RepoError::InvalidParent)));
    }

    #[tokio::test]
    async fn slug_unique_per_publish_day() {
        let store = InMemoryStore::new();
        let author = Uuid::new_v4();

        PostRepository::insert(&store, post(author, "Same Title"))
            .await
            .unwrap();
        let clash = PostRepository::insert(&store, post(author, "Same Title")).await;

        assert!(matches!(clash, Err(RepoError::SlugConflict)));
    }

    #[tokio::test]
    async fn same_slug_on_a_different_day_is_fine() {
        let store = InMemoryStore::new();
        let author = Uuid::new_v4();

        let mut yesterday = post(author, "Daily Note");
        yesterday.publish_date -= chrono::TimeDelta::days(1);
        PostRepository::insert(&store, yesterday).await.unwrap();

        let today = post(author, "Daily Note");
        assert!(PostRepository::insert(&store, today).await.is_ok());
    }

    #[tokio::test]
    async fn published_list_is_newest_first_and_paged() {
        let store = InMemoryStore::new();
        let author = Uuid::new_v4();

        for i in 0..7 {
            let mut p = post(author, &format!("Post {i}"));
            p.publish_date -= chrono::TimeDelta::days(i);
            PostRepository::insert(&store, p).await.unwrap();
        }
        let mut draft = post(author, "Hidden");
        draft.status = PostStatus::Draft;
        PostRepository::insert(&store, draft).await.unwrap();

        let first = store.list_published(1, 5).await.unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].slug, "post-0");

        let second = store.list_published(2, 5).await.unwrap();
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn user_lookup_by_email_and_username() {
        let store = InMemoryStore::new();
        let user = User::new(
            "alice".into(),
            "alice@example.com".into(),
            "hash".into(),
            Role::Reader,
        );
        BaseRepository::<User, Uuid>::save(&store, user.clone())
            .await
            .unwrap();

        assert!(
            store
                .find_by_email("alice@example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(store.find_by_username("alice").await.unwrap().is_some());
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }
}
