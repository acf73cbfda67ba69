use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entry::CachedData;
use crate::api::Endpoint;
use crate::models::EntityKind;

/// How long an entry nobody is watching survives before eviction.
pub const KEEP_UNUSED_FOR: Duration = Duration::from_secs(60);

/// Invalidation tags. A query provides one; a mutation invalidates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Admin,
    User,
    Author,
    Audiobook,
    Category,
}

impl Tag {
    pub fn of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::User => Tag::User,
            EntityKind::Author => Tag::Author,
            EntityKind::Audiobook => Tag::Audiobook,
            EntityKind::Category => Tag::Category,
        }
    }
}

/// Identity of a cached query: the endpoint plus its serialized arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub endpoint: Endpoint,
    pub args: String,
}

impl QueryKey {
    pub fn new<A: Serialize + ?Sized>(endpoint: Endpoint, args: &A) -> Self {
        Self {
            endpoint,
            args: serde_json::to_string(args).unwrap_or_default(),
        }
    }

    /// Key for a query that takes no arguments.
    pub fn bare(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            args: String::new(),
        }
    }

    pub fn tag(&self) -> Tag {
        self.endpoint.provides()
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: Option<CachedData<V>>,
    subscribers: usize,
    stale: bool,
    unused_since: Option<Instant>,
}

impl<V> Entry<V> {
    fn new(now: Instant) -> Self {
        Self {
            value: None,
            subscribers: 0,
            stale: false,
            unused_since: Some(now),
        }
    }
}

/// Tag-invalidated query cache.
///
/// Screens subscribe to the key they display. After a mutation the caller
/// invalidates its tag: entries still subscribed are marked stale and their
/// keys handed back for refetch, the rest are dropped.
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: HashMap<QueryKey, Entry<V>>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> QueryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn subscribe(&mut self, key: &QueryKey, now: Instant) {
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(now));
        entry.subscribers += 1;
        entry.unused_since = None;
    }

    pub fn unsubscribe(&mut self, key: &QueryKey, now: Instant) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
            if entry.subscribers == 0 {
                entry.unused_since = Some(now);
            }
        }
    }

    pub fn is_active(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|e| e.subscribers > 0)
    }

    /// Cached value for `key`, unless it is missing or stale.
    pub fn get(&self, key: &QueryKey) -> Option<&CachedData<V>> {
        self.entries
            .get(key)
            .filter(|e| !e.stale)
            .and_then(|e| e.value.as_ref())
    }

    pub fn needs_fetch(&self, key: &QueryKey) -> bool {
        self.get(key).is_none()
    }

    pub fn insert(&mut self, key: QueryKey, value: V, now: Instant) {
        let entry = self.entries.entry(key).or_insert_with(|| Entry::new(now));
        entry.value = Some(CachedData::new(value));
        entry.stale = false;
    }

    /// Invalidate every entry providing `tag`. Returns the keys that are still
    /// subscribed and must be refetched.
    pub fn invalidate(&mut self, tag: Tag) -> Vec<QueryKey> {
        let mut refetch = Vec::new();
        self.entries.retain(|key, entry| {
            if key.tag() != tag {
                return true;
            }
            if entry.subscribers > 0 {
                entry.stale = true;
                refetch.push(key.clone());
                true
            } else {
                false
            }
        });
        debug!(?tag, refetch = refetch.len(), "Invalidated cache tag");
        refetch
    }

    /// Drop entries nobody has watched for [`KEEP_UNUSED_FOR`].
    pub fn collect_garbage(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| match entry.unused_since {
            Some(since) => now.saturating_duration_since(since) < KEEP_UNUSED_FOR,
            None => true,
        });
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
