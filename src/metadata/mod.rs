//! Display-name resolution for Slack entities
//!
//! Key features:
//! - Lazy-loading: names are fetched on first use only
//! - Usergroups are listed in bulk once, since Slack has no per-ID lookup
//! - Write-once entries: nothing is evicted or refreshed
//! - Graceful degradation: falls back to the raw ID if the API fails

mod cache;
mod mentions;
mod types;

pub use cache::NameCache;
pub use mentions::resolve_mentions;
pub use types::{CacheStats, EntityKind, NameSource, user_display_name};
