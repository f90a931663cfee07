pub mod memory;

pub use memory::{CacheEntry, CacheKeyInfo, CacheStats, EntryOptions, TtlCache};
