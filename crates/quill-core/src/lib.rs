//! # Quill Core
//!
//! The domain layer of the Quill engagement engine.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod entitlement;
pub mod error;
pub mod ports;
pub mod service;

pub use error::{DomainError, RepoError};
