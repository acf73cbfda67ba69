//! Client-side query cache with tag invalidation.

mod entry;
mod query;

pub use entry::CachedData;
pub use query::{QueryCache, QueryKey, Tag, KEEP_UNUSED_FOR};
