//! Domain services - the engagement engine's operations, expressed over the
//! ports so they run identically against the in-memory store and Postgres.

mod comments;
mod likes;
mod posts;
mod subscription;

pub use comments::{CommentService, CommentThread};
pub use likes::{LikeOutcome, LikeService};
pub use posts::{NewPost, PostService, PostUpdate, PostView};
pub use subscription::{SUBSCRIPTION_DAYS, SubscriptionService, SubscriptionStatus};
