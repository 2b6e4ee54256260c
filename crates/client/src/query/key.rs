//! Query keys and cache-time presets.

use std::time::Duration;

use minisource_shared::PaginationParams;

/// Hierarchical cache key. Invalidation matches on key prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Cache lifetimes used as stale times.
pub struct CacheTime;

impl CacheTime {
    pub const SHORT: Duration = Duration::from_secs(60);
    pub const MEDIUM: Duration = Duration::from_secs(5 * 60);
    pub const LONG: Duration = Duration::from_secs(30 * 60);
    pub const VERY_LONG: Duration = Duration::from_secs(60 * 60);
    pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);
}

/// Centralized keys so invalidation stays consistent.
pub mod query_keys {
    use super::*;

    /// Everything cached for the user feature.
    pub fn user_all() -> QueryKey {
        QueryKey::new(["user"])
    }

    /// Key for one user by id. Ids share the namespace of the fixed keys
    /// below, so `user_detail("profile")` is the same key as
    /// [`user_profile`] and `user_detail("list")` falls under every
    /// [`user_list`] key's prefix. Backend ids are UUIDs.
    pub fn user_detail(id: &str) -> QueryKey {
        QueryKey::new(["user", id])
    }

    pub fn user_profile() -> QueryKey {
        QueryKey::new(["user", "profile"])
    }

    pub fn user_list(params: &PaginationParams) -> QueryKey {
        let filters = serde_json::to_string(params).unwrap_or_default();
        QueryKey::new(["user".to_string(), "list".to_string(), filters])
    }
}
