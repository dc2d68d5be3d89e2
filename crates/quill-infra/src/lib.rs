//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`: the
//! engagement store, the fan-out broker, and the auth services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL engagement store via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `redis` - Redis-bridged fan-out for multi-process deployments

pub mod database;
pub mod fanout;
pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use fanout::InMemoryFanout;
pub use store::InMemoryStore;

pub use database::DatabaseConnections;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

// Re-exports - Postgres
#[cfg(feature = "postgres")]
pub use database::{
    PostgresCommentRepository, PostgresLikeRepository, PostgresPostRepository,
    PostgresProfileRepository, PostgresUserRepository,
};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use fanout::{RedisFanout, RedisFanoutConfig};
