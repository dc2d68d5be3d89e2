//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentFanout, CommentRepository, LikeRepository, PostRepository, ProfileRepository,
    UserRepository,
};
use quill_core::service::{CommentService, LikeService, PostService, SubscriptionService};
use quill_infra::DatabaseConnections;
use quill_infra::fanout::InMemoryFanout;
use quill_infra::store::InMemoryStore;

use crate::config::AppConfig;

/// Shared application state: the engine services plus the raw repositories
/// the auth handlers need.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub posts: PostService,
    pub comments: CommentService,
    pub likes: LikeService,
    pub subscription: SubscriptionService,
    pub fanout: Arc<dyn CommentFanout>,
    pub db: Option<Arc<DatabaseConnections>>,
    pub page_size: u64,
}

struct Repos {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn LikeRepository>,
}

/// One shared in-memory store behind every repository port, so cascade
/// deletes stay atomic across them.
fn memory_repos() -> Repos {
    let store = Arc::new(InMemoryStore::new());
    Repos {
        users: store.clone(),
        profiles: store.clone(),
        posts: store.clone(),
        comments: store.clone(),
        likes: store,
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let fanout = build_fanout().await;

        #[cfg(feature = "postgres")]
        let (db, repos): (Option<Arc<DatabaseConnections>>, Repos) = {
            use quill_infra::{
                PostgresCommentRepository, PostgresLikeRepository, PostgresPostRepository,
                PostgresProfileRepository, PostgresUserRepository,
            };

            if let Some(db_config) = config.database.as_ref() {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        let conn = Arc::new(connections);
                        let repos = Repos {
                            users: Arc::new(PostgresUserRepository::new(conn.main.clone())),
                            profiles: Arc::new(PostgresProfileRepository::new(conn.main.clone())),
                            posts: Arc::new(PostgresPostRepository::new(conn.main.clone())),
                            comments: Arc::new(PostgresCommentRepository::new(conn.main.clone())),
                            likes: Arc::new(PostgresLikeRepository::new(conn.main.clone())),
                        };
                        (Some(conn), repos)
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using the in-memory store.",
                            e
                        );
                        (None, memory_repos())
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (None, memory_repos())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (db, repos): (Option<Arc<DatabaseConnections>>, Repos) = {
            tracing::info!("Running without postgres feature - using the in-memory store");
            (None, memory_repos())
        };

        let posts = PostService::new(
            repos.posts.clone(),
            repos.comments.clone(),
            repos.likes.clone(),
            repos.users.clone(),
        );
        let comments = CommentService::new(
            repos.posts.clone(),
            repos.comments.clone(),
            repos.users.clone(),
            fanout.clone(),
        );
        let likes = LikeService::new(repos.posts, repos.likes);
        let subscription = SubscriptionService::new(repos.profiles.clone());

        tracing::info!("Application state initialized");

        Self {
            users: repos.users,
            profiles: repos.profiles,
            posts,
            comments,
            likes,
            subscription,
            fanout,
            db,
            page_size: config.page_size,
        }
    }
}

/// Pick the fan-out broker: Redis-bridged when configured, in-process
/// otherwise.
async fn build_fanout() -> Arc<dyn CommentFanout> {
    #[cfg(feature = "redis")]
    if std::env::var("REDIS_URL").is_ok() {
        match quill_infra::RedisFanout::from_env().await {
            Ok(fanout) => {
                tracing::info!("Using Redis-bridged comment fan-out");
                return Arc::new(fanout);
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect Redis fan-out: {}. Falling back to the in-process broker.",
                    e
                );
            }
        }
    }

    Arc::new(InMemoryFanout::new())
}
