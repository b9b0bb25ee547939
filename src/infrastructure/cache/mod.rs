//! Cache infrastructure - moka-backed store and its purge daemon

mod in_memory;
mod purge;

pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use purge::CachePurgeDaemon;
