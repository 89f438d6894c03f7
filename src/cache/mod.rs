//! Translation cache.

mod sqlite;

pub use sqlite::CacheManager;
