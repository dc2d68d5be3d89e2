//! SeaORM entities for the engagement schema.

pub mod comment;
pub mod like;
pub mod post;
pub mod profile;
pub mod user;
