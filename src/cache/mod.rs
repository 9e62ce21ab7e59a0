//! Local cache for remote modules
//!
//! Downloaded modules are stored under a URL-derived path together with
//! the HTTP response headers they arrived with, so later runs can serve
//! them without a network round trip for as long as those headers say
//! the content is fresh.

pub mod freshness;
pub mod key;
pub mod metadata;
pub mod store;

pub use freshness::{is_stale, FreshnessOptions};
pub use key::CacheKey;
pub use metadata::{EntryMetadata, HeaderSet};
pub use store::{CacheEntrySummary, CacheStore};
