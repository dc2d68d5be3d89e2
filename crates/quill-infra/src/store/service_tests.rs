//! End-to-end tests of the engagement engine over the in-memory adapters.

use std::sync::{Arc, Mutex};

use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use quill_core::domain::{AccessLevel, PostStatus, Profile, Role, User};
use quill_core::entitlement::PREVIEW_CHARS;
use quill_core::error::DomainError;
use quill_core::ports::{
    BaseRepository, CommentEvent, CommentFanout, ProfileRepository, Recipient,
};
use quill_core::service::{
    CommentService, LikeService, NewPost, PostService, SubscriptionService,
};

use crate::fanout::InMemoryFanout;
use crate::store::InMemoryStore;

struct Engine {
    store: Arc<InMemoryStore>,
    fanout: Arc<InMemoryFanout>,
    posts: PostService,
    comments: CommentService,
    likes: LikeService,
    subscription: SubscriptionService,
}

fn engine() -> Engine {
    let store = Arc::new(InMemoryStore::new());
    let fanout = Arc::new(InMemoryFanout::new());
    Engine {
        posts: PostService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        ),
        comments: CommentService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            fanout.clone(),
        ),
        likes: LikeService::new(store.clone(), store.clone()),
        subscription: SubscriptionService::new(store.clone()),
        store,
        fanout,
    }
}

async fn register(engine: &Engine, username: &str, role: Role) -> User {
    let user = User::new(
        username.to_string(),
        format!("{username}@example.com"),
        "hash".to_string(),
        role,
    );
    let user = BaseRepository::<User, Uuid>::save(engine.store.as_ref(), user)
        .await
        .unwrap();
    ProfileRepository::save(engine.store.as_ref(), Profile::for_user(user.id))
        .await
        .unwrap();
    user
}

fn new_post(title: &str, body: &str, access_level: AccessLevel) -> NewPost {
    NewPost {
        title: title.to_string(),
        body: body.to_string(),
        category: None,
        tags: vec![],
        access_level,
        status: PostStatus::Published,
    }
}

struct RecordingViewer {
    id: Uuid,
    events: Mutex<Vec<CommentEvent>>,
}

impl RecordingViewer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            events: Mutex::new(Vec::new()),
        })
    }
}

impl Recipient for RecordingViewer {
    fn id(&self) -> Uuid {
        self.id
    }

    fn deliver(&self, event: &CommentEvent) -> bool {
        self.events.lock().unwrap().push(event.clone());
        true
    }
}

#[tokio::test]
async fn non_premium_viewer_hits_the_paywall() {
    let engine = engine();
    let author = register(&engine, "betty", Role::Author).await;
    let reader = register(&engine, "arthur", Role::Reader).await;

    let body = "deep analysis ".repeat(40);
    let post = engine
        .posts
        .create(
            author.id,
            author.role,
            new_post("Premium Piece", &body, AccessLevel::Premium),
        )
        .await
        .unwrap();

    let view = engine.posts.view(&post.slug, reader.id, false).await.unwrap();

    assert!(view.paywalled);
    let expected: String = body.chars().take(PREVIEW_CHARS).collect();
    assert_eq!(view.body, format!("{expected}..."));
}

#[tokio::test]
async fn free_posts_are_fully_visible_to_everyone() {
    let engine = engine();
    let author = register(&engine, "betty", Role::Author).await;
    let reader = register(&engine, "arthur", Role::Reader).await;

    let post = engine
        .posts
        .create(
            author.id,
            author.role,
            new_post("Open Piece", "everyone reads this", AccessLevel::Free),
        )
        .await
        .unwrap();

    for premium in [false, true] {
        let view = engine
            .posts
            .view(&post.slug, reader.id, premium)
            .await
            .unwrap();
        assert!(!view.paywalled);
        assert_eq!(view.body, "everyone reads this");
    }
}

#[tokio::test]
async fn subscription_unlocks_premium_bodies() {
    let engine = engine();
    let author = register(&engine, "betty", Role::Author).await;
    let reader = register(&engine, "arthur", Role::Reader).await;

    let post = engine
        .posts
        .create(
            author.id,
            author.role,
            new_post("Members Only", "the good stuff", AccessLevel::Premium),
        )
        .await
        .unwrap();

    engine.subscription.activate(reader.id).await.unwrap();
    let premium = engine.subscription.is_premium(reader.id).await.unwrap();
    assert!(premium);

    let view = engine
        .posts
        .view(&post.slug, reader.id, premium)
        .await
        .unwrap();
    assert!(!view.paywalled);
    assert_eq!(view.body, "the good stuff");
}

#[tokio::test]
async fn activation_resets_rather_than_extends() {
    let engine = engine();
    let reader = register(&engine, "arthur", Role::Reader).await;

    let first = engine.subscription.activate(reader.id).await.unwrap();
    let second = engine.subscription.activate(reader.id).await.unwrap();

    // not cumulative: the clock restarts at +30 days from today
    assert_eq!(first, second);
    assert_eq!(first, Utc::now().date_naive() + TimeDelta::days(30));
}

#[tokio::test]
async fn expired_subscription_is_inactive_despite_the_flag() {
    let engine = engine();
    let reader = register(&engine, "arthur", Role::Reader).await;

    let mut profile = engine
        .store
        .find_by_user(reader.id)
        .await
        .unwrap()
        .unwrap();
    profile.is_subscribed = true;
    profile.subscription_end_date = Some(Utc::now().date_naive() - TimeDelta::days(1));
    ProfileRepository::save(engine.store.as_ref(), profile)
        .await
        .unwrap();

    assert!(!engine.subscription.is_premium(reader.id).await.unwrap());
    let status = engine.subscription.status(reader.id).await.unwrap();
    assert!(!status.active);
    assert!(status.end_date.is_some());
}

#[tokio::test]
async fn toggles_alternate_and_count_tracks_rows() {
    let engine = engine();
    let author = register(&engine, "betty", Role::Author).await;
    let reader = register(&engine, "arthur", Role::Reader).await;

    let post = engine
        .posts
        .create(
            author.id,
            author.role,
            new_post("Likeable", "body", AccessLevel::Free),
        )
        .await
        .unwrap();

    let first = engine.likes.toggle(&post.slug, reader.id).await.unwrap();
    assert!(first.liked);
    assert_eq!(first.count, 1);

    let second = engine.likes.toggle(&post.slug, reader.id).await.unwrap();
    assert!(!second.liked);
    assert_eq!(second.count, 0);

    let third = engine.likes.toggle(&post.slug, reader.id).await.unwrap();
    assert!(third.liked);
    assert_eq!(third.count, 1);
}

#[tokio::test]
async fn rapid_double_toggle_nets_to_nothing() {
    let engine = engine();
    let author = register(&engine, "betty", Role::Author).await;
    let reader = register(&engine, "arthur", Role::Reader).await;

    let post = engine
        .posts
        .create(
            author.id,
            author.role,
            new_post("Flip Flop", "body", AccessLevel::Free),
        )
        .await
        .unwrap();

    engine.likes.toggle(&post.slug, reader.id).await.unwrap();
    let after = engine.likes.toggle(&post.slug, reader.id).await.unwrap();

    assert!(!after.liked);
    assert_eq!(after.count, 0);
}

#[tokio::test]
async fn different_users_like_independently() {
    let engine = engine();
    let author = register(&engine, "betty", Role::Author).await;
    let arthur = register(&engine, "arthur", Role::Reader).await;
    let clara = register(&engine, "clara", Role::Reader).await;

    let post = engine
        .posts
        .create(
            author.id,
            author.role,
            new_post("Popular", "body", AccessLevel::Free),
        )
        .await
        .unwrap();

    let slug = post.slug.clone();
    let (a, b) = tokio::join!(
        engine.likes.toggle(&slug, arthur.id),
        engine.likes.toggle(&slug, clara.id),
    );
    assert!(a.unwrap().liked);
    assert!(b.unwrap().liked);

    let count = engine.likes.toggle(&slug, arthur.id).await.unwrap().count;
    assert_eq!(count, 1); // arthur un-liked; clara's like remains
}

#[tokio::test]
async fn joined_viewer_receives_exactly_one_event() {
    let engine = engine();
    let author = register(&engine, "betty", Role::Author).await;
    let commenter = register(&engine, "arthur", Role::Reader).await;

    let post = engine
        .posts
        .create(
            author.id,
            author.role,
            new_post("Live Thread", "body", AccessLevel::Free),
        )
        .await
        .unwrap();

    let viewer = RecordingViewer::new();
    engine.fanout.join(post.id, viewer.clone()).await;

    engine
        .comments
        .create(&post.slug, commenter.id, "first!".to_string(), None)
        .await
        .unwrap();

    let events = viewer.events.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].author, "arthur");
    assert_eq!(events[0].body, "first!");
}

#[tokio::test]
async fn viewer_who_left_misses_later_comments() {
    let engine = engine();
    let author = register(&engine, "betty", Role::Author).await;
    let commenter = register(&engine, "arthur", Role::Reader).await;

    let post = engine
        .posts
        .create(
            author.id,
            author.role,
            new_post("Quiet Exit", "body", AccessLevel::Free),
        )
        .await
        .unwrap();

    let viewer = RecordingViewer::new();
    engine.fanout.join(post.id, viewer.clone()).await;
    engine.fanout.leave(post.id, viewer.id()).await;

    engine
        .comments
        .create(&post.slug, commenter.id, "anyone here?".to_string(), None)
        .await
        .unwrap();

    assert!(viewer.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cross_post_reply_is_rejected_end_to_end() {
    let engine = engine();
    let author = register(&engine, "betty", Role::Author).await;

    let first = engine
        .posts
        .create(
            author.id,
            author.role,
            new_post("Thread A", "body", AccessLevel::Free),
        )
        .await
        .unwrap();
    let second = engine
        .posts
        .create(
            author.id,
            author.role,
            new_post("Thread B", "body", AccessLevel::Free),
        )
        .await
        .unwrap();

    let parent = engine
        .comments
        .create(&first.slug, author.id, "root".to_string(), None)
        .await
        .unwrap();

    let result = engine
        .comments
        .create(
            &second.slug,
            author.id,
            "lost reply".to_string(),
            Some(parent.id),
        )
        .await;

    assert!(matches!(result, Err(DomainError::InvalidParent)));
}

#[tokio::test]
async fn readers_cannot_publish() {
    let engine = engine();
    let reader = register(&engine, "arthur", Role::Reader).await;

    let result = engine
        .posts
        .create(
            reader.id,
            reader.role,
            new_post("Nope", "body", AccessLevel::Free),
        )
        .await;

    assert!(matches!(result, Err(DomainError::Forbidden)));
}

#[tokio::test]
async fn only_the_author_mutates_a_post() {
    let engine = engine();
    let betty = register(&engine, "betty", Role::Author).await;
    let dora = register(&engine, "dora", Role::Author).await;

    let post = engine
        .posts
        .create(
            betty.id,
            betty.role,
            new_post("Mine", "body", AccessLevel::Free),
        )
        .await
        .unwrap();

    let result = engine.posts.delete(&post.slug, dora.id).await;
    assert!(matches!(result, Err(DomainError::Forbidden)));

    engine.posts.delete(&post.slug, betty.id).await.unwrap();
    let gone = engine.posts.view(&post.slug, betty.id, false).await;
    assert!(matches!(gone, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn drafts_are_invisible_to_other_users() {
    let engine = engine();
    let betty = register(&engine, "betty", Role::Author).await;
    let reader = register(&engine, "arthur", Role::Reader).await;

    let mut draft = new_post("Work In Progress", "unfinished", AccessLevel::Free);
    draft.status = PostStatus::Draft;
    let post = engine.posts.create(betty.id, betty.role, draft).await.unwrap();

    assert!(engine.posts.list(1, 5).await.unwrap().is_empty());
    assert!(matches!(
        engine.posts.view(&post.slug, reader.id, false).await,
        Err(DomainError::NotFound(_))
    ));
    // the author still sees their own draft
    assert!(engine.posts.view(&post.slug, betty.id, false).await.is_ok());
}

#[tokio::test]
async fn viewing_increments_the_counter() {
    let engine = engine();
    let betty = register(&engine, "betty", Role::Author).await;

    let post = engine
        .posts
        .create(
            betty.id,
            betty.role,
            new_post("Counted", "body", AccessLevel::Free),
        )
        .await
        .unwrap();

    engine.posts.view(&post.slug, betty.id, false).await.unwrap();
    let view = engine.posts.view(&post.slug, betty.id, false).await.unwrap();
    assert_eq!(view.post.view_count, 2);
}
