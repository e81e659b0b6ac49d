//! Entity kinds and lookup seam for the display-name cache

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// The kinds of Slack entity whose IDs are resolved to names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Subteam,
    Channel,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Subteam => "subteam",
            EntityKind::Channel => "channel",
        };
        f.write_str(name)
    }
}

/// Where the cache goes on a miss.
///
/// `Ok(None)` means the service answered but carried no usable name.
#[async_trait]
pub trait NameSource: Send + Sync {
    async fn lookup_user(&self, user_id: &str) -> Result<Option<String>>;

    async fn lookup_channel(&self, channel_id: &str) -> Result<Option<String>>;

    /// Every usergroup as `(id, handle)`; the service has no per-ID lookup
    async fn list_subteams(&self) -> Result<Vec<(String, String)>>;
}

/// Best display name from a `users.info` user object
pub fn user_display_name(user: &Value) -> Option<String> {
    let profile = user.get("profile")?;
    ["display_name", "real_name"]
        .iter()
        .filter_map(|field| profile.get(*field).and_then(Value::as_str))
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStats {
    pub user_hits: u64,
    pub user_misses: u64,
    pub subteam_hits: u64,
    pub subteam_misses: u64,
    pub channel_hits: u64,
    pub channel_misses: u64,
    pub api_calls: u64,
    pub api_errors: u64,
}

impl CacheStats {
    pub(crate) fn record(&mut self, kind: EntityKind, hit: bool) {
        let counter = match (kind, hit) {
            (EntityKind::User, true) => &mut self.user_hits,
            (EntityKind::User, false) => &mut self.user_misses,
            (EntityKind::Subteam, true) => &mut self.subteam_hits,
            (EntityKind::Subteam, false) => &mut self.subteam_misses,
            (EntityKind::Channel, true) => &mut self.channel_hits,
            (EntityKind::Channel, false) => &mut self.channel_misses,
        };
        *counter += 1;
    }

    pub fn hit_rate(hits: u64, misses: u64) -> u32 {
        if hits + misses > 0 {
            (hits as f32 / (hits + misses) as f32 * 100.0) as u32
        } else {
            0
        }
    }
}
