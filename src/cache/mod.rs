pub mod query_cache;

pub use query_cache::{CacheKey, CachedWarehouse};
