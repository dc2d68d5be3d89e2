//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod fanout;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use fanout::{CommentEvent, CommentFanout, Recipient, comment_channel};
pub use repository::{
    BaseRepository, CommentRepository, LikeRepository, PostRepository, ProfileRepository,
    UserRepository,
};
