//! Fan-out broker implementations.

mod memory;

pub use memory::InMemoryFanout;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisFanout, RedisFanoutConfig};
