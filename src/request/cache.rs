//! Read cache for query results.
//!
//! Entries are keyed by logical query name plus an optional record id, and
//! stay fresh for a configurable window. Writes never update entries in
//! place; callers invalidate a query name after a successful mutation.
//!
//! Each query name carries a generation that invalidation bumps. A read
//! records the generation it started under and its result is only stored
//! if no invalidation happened in between.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub name: String,
    pub id: Option<String>,
}

impl QueryKey {
    pub fn new(name: impl Into<String>, id: Option<&str>) -> Self {
        Self {
            name: name.into(),
            id: id.map(str::to_string),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{}", self.name, id),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedEntry {
    value: Value,
    fetched_at: Instant,
}

impl CachedEntry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.fetched_at.elapsed() < stale_time
    }
}

#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CachedEntry>,
    stale_time: Duration,
    generations: HashMap<String, u64>,
    /// Bumped by `clear`, which invalidates every name at once
    epoch: u64,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stale_time,
            generations: HashMap::new(),
            epoch: 0,
        }
    }

    /// Current generation of a query name; grows with every invalidation
    pub fn generation(&self, name: &str) -> u64 {
        self.epoch + self.generations.get(name).copied().unwrap_or(0)
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Cached value for `key` if still inside the freshness window
    pub fn get_fresh(&self, key: &QueryKey) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(self.stale_time) {
            trace!("cache hit for {}", key);
            Some(entry.value.clone())
        } else {
            trace!("cache entry for {} is stale", key);
            None
        }
    }

    pub fn insert(&mut self, key: QueryKey, value: Value) {
        self.entries.insert(
            key,
            CachedEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Store a read result fetched under `generation`; dropped when the name
    /// was invalidated since. Returns whether the value was stored.
    pub fn insert_if_current(&mut self, key: QueryKey, value: Value, generation: u64) -> bool {
        if self.generation(&key.name) != generation {
            trace!("discarding result for {}: invalidated while in flight", key);
            return false;
        }
        self.insert(key, value);
        true
    }

    /// Drop every entry for a query name, detail entries included, and
    /// bump its generation. Returns the number of entries removed.
    pub fn invalidate(&mut self, name: &str) -> usize {
        *self.generations.entry(name.to_string()).or_insert(0) += 1;
        let before = self.entries.len();
        self.entries.retain(|key, _| key.name != name);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.epoch += 1;
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_entries_are_returned() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new("categoryList", None);
        cache.insert(key.clone(), json!([1, 2]));
        assert_eq!(cache.get_fresh(&key), Some(json!([1, 2])));
    }

    #[test]
    fn zero_stale_time_never_hits() {
        let mut cache = QueryCache::new(Duration::ZERO);
        let key = QueryKey::new("categoryList", None);
        cache.insert(key.clone(), json!([]));
        assert_eq!(cache.get_fresh(&key), None);
    }

    #[test]
    fn invalidate_drops_list_and_detail_entries() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(QueryKey::new("membershipList", None), json!([]));
        cache.insert(QueryKey::new("membershipList", Some("7")), json!({}));
        cache.insert(QueryKey::new("categoryList", None), json!([]));

        assert_eq!(cache.invalidate("membershipList"), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn results_from_before_an_invalidation_are_dropped() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new("groupList", None);
        let started = cache.generation("groupList");

        cache.invalidate("groupList");
        assert!(!cache.insert_if_current(key.clone(), json!(["old"]), started));
        assert_eq!(cache.get_fresh(&key), None);

        let restarted = cache.generation("groupList");
        assert!(cache.insert_if_current(key.clone(), json!(["new"]), restarted));
        assert_eq!(cache.get_fresh(&key), Some(json!(["new"])));

        // Other names are unaffected; clear moves every name on
        let other = cache.generation("categoryList");
        cache.clear();
        assert_ne!(cache.generation("categoryList"), other);
    }

    #[test]
    fn key_display_includes_id() {
        assert_eq!(QueryKey::new("profile", None).to_string(), "profile");
        assert_eq!(QueryKey::new("category", Some("3")).to_string(), "category/3");
    }
}
