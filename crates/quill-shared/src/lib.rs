//! # Quill Shared
//!
//! Wire types shared with clients: request/response DTOs, the realtime
//! event shapes, and RFC 7807 error bodies.

pub mod dto;
pub mod events;
pub mod response;

pub use response::ErrorResponse;
