//! Cache Decorators
//!
//! Layers that wrap exactly one inner cache and add behavior while keeping the
//! `Cache` capability: eviction, scheduled clearing, serialization, hit/miss
//! logging, synchronization and single-flight blocking.

mod blocking;
mod fifo;
mod logging;
mod lru;
mod scheduled;
mod serialized;
mod synchronized;

pub use blocking::BlockingCache;
pub use fifo::{FifoCache, DEFAULT_FIFO_SIZE};
pub use logging::LoggingCache;
pub use lru::{LruCache, LruTracker, DEFAULT_LRU_SIZE};
pub use scheduled::{ScheduledCache, DEFAULT_CLEAR_INTERVAL};
pub use serialized::SerializedCache;
pub use synchronized::SynchronizedCache;
