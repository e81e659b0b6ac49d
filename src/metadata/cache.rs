//! Lazy display-name cache for users, usergroups and channels

use crate::metadata::types::{CacheStats, EntityKind, NameSource};
use dashmap::DashMap;
use tokio::sync::{OnceCell, RwLock};

/// ID → display name cache with lazy loading from a [`NameSource`].
///
/// Entries are written once and never evicted or replaced. Lookup failures
/// are absorbed: the raw ID is cached as its own name and returned.
pub struct NameCache {
    users: DashMap<String, String>,
    subteams: DashMap<String, String>,
    channels: DashMap<String, String>,

    /// Completes once the single usergroup listing has been attempted;
    /// concurrent first lookups wait on it instead of caching raw IDs
    subteams_listed: OnceCell<()>,

    stats: RwLock<CacheStats>,
}

impl Default for NameCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NameCache {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            subteams: DashMap::new(),
            channels: DashMap::new(),
            subteams_listed: OnceCell::new(),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    fn map(&self, kind: EntityKind) -> &DashMap<String, String> {
        match kind {
            EntityKind::User => &self.users,
            EntityKind::Subteam => &self.subteams,
            EntityKind::Channel => &self.channels,
        }
    }

    /// Cached name without touching the network
    pub fn cached(&self, kind: EntityKind, id: &str) -> Option<String> {
        self.map(kind).get(id).map(|name| name.value().clone())
    }

    /// Resolve an ID to its display name, fetching on first use
    pub async fn resolve(&self, source: &dyn NameSource, kind: EntityKind, id: &str) -> String {
        if let Some(name) = self.cached(kind, id) {
            self.stats.write().await.record(kind, true);
            tracing::trace!(kind = %kind, id = %id, name = %name, "Name cache hit");
            return name;
        }

        self.stats.write().await.record(kind, false);
        tracing::debug!(kind = %kind, id = %id, "Name cache miss");

        match kind {
            EntityKind::User | EntityKind::Channel => self.fetch_one(source, kind, id).await,
            EntityKind::Subteam => {
                self.list_subteams_once(source).await;
                self.insert_once(kind, id, id.to_string())
            }
        }
    }

    async fn fetch_one(&self, source: &dyn NameSource, kind: EntityKind, id: &str) -> String {
        self.stats.write().await.api_calls += 1;

        let result = match kind {
            EntityKind::User => source.lookup_user(id).await,
            _ => source.lookup_channel(id).await,
        };

        let name = match result {
            Ok(Some(name)) => {
                tracing::debug!(kind = %kind, id = %id, name = %name, "Fetched and cached name");
                name
            }
            Ok(None) => id.to_string(),
            Err(e) => {
                self.stats.write().await.api_errors += 1;
                tracing::warn!(
                    kind = %kind,
                    id = %id,
                    error = %e,
                    "Failed to resolve name, using ID as fallback"
                );
                id.to_string()
            }
        };

        self.insert_once(kind, id, name)
    }

    async fn list_subteams_once(&self, source: &dyn NameSource) {
        self.subteams_listed
            .get_or_init(|| async {
                self.stats.write().await.api_calls += 1;
                match source.list_subteams().await {
                    Ok(groups) => {
                        let count = groups.len();
                        for (id, handle) in groups {
                            self.subteams.entry(id).or_insert(handle);
                        }
                        tracing::info!(subteams = count, "Cached usergroup handles");
                    }
                    Err(e) => {
                        self.stats.write().await.api_errors += 1;
                        tracing::warn!(error = %e, "Failed to list usergroups, using IDs as fallback");
                    }
                }
            })
            .await;
    }

    /// Insert unless another caller got there first; returns the stored name
    fn insert_once(&self, kind: EntityKind, id: &str, name: String) -> String {
        self.map(kind)
            .entry(id.to_string())
            .or_insert(name)
            .value()
            .clone()
    }

    pub async fn get_stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    /// Current cache sizes as (users, subteams, channels)
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.users.len(), self.subteams.len(), self.channels.len())
    }

    pub async fn log_stats(&self) {
        let stats = self.get_stats().await;
        let (users, subteams, channels) = self.sizes();

        tracing::info!(
            users_cached = users,
            subteams_cached = subteams,
            channels_cached = channels,
            user_hit_rate = CacheStats::hit_rate(stats.user_hits, stats.user_misses),
            channel_hit_rate = CacheStats::hit_rate(stats.channel_hits, stats.channel_misses),
            api_calls = stats.api_calls,
            api_errors = stats.api_errors,
            "Name cache statistics"
        );
    }
}
