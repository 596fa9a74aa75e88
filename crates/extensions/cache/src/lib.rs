//! Result cache for ragfuse.
//!
//! Backends implement [`CacheBackend`](ragfuse_protocols::CacheBackend) and
//! store opaque JSON values:
//!
//! - [`MemoryCache`]: concurrent in-process map.
//! - [`DiskCache`]: one JSON file per entry plus an `index.json`.
//! - [`RemoteCache`]: Redis over its REST command protocol.
//! - [`NullCache`]: stores nothing.
//!
//! [`CacheManager`] wraps a backend with typed access, hit/miss statistics
//! and memoization. It is an ordinary value; share it through an `Arc`.

mod disk;
mod factory;
mod key;
mod manager;
mod memory;
mod null;
mod remote;

pub use disk::DiskCache;
pub use factory::CacheFactory;
pub use key::cache_key;
pub use manager::{CacheManager, CacheStatsSnapshot};
pub use memory::MemoryCache;
pub use null::NullCache;
pub use remote::RemoteCache;
