//! Capacity-bounded LRU cache for user and project lookups.
//!
//! Views attribute status entries and chat messages to user names, which
//! means repeated `GET /api/users/{id}` lookups. The memo is bounded so a
//! long-lived process cannot grow it without limit; least-recently-used
//! entries are evicted first.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use domus_core::types::DbId;

use crate::gateway::{ApiError, RestGateway, User};

/// An LRU cache with a fixed capacity.
///
/// Lookups refresh recency; inserting past capacity evicts the least
/// recently used entry. Recency is tracked with a sequence counter per
/// entry, which is plenty for the page-scoped lookup sizes involved.
pub struct LookupCache<K, V>
where
    K: Hash + Eq + Clone,
{
    capacity: usize,
    entries: HashMap<K, Entry<V>>,
    clock: u64,
}

struct Entry<V> {
    value: V,
    last_used: u64,
}

impl<K, V> LookupCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Cache capacity must be greater than 0");
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            clock: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key, refreshing its recency on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = clock;
            &entry.value
        })
    }

    /// Insert or replace a value, evicting the least recently used entry
    /// when the cache is full.
    pub fn insert(&mut self, key: K, value: V) {
        self.clock += 1;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            Entry {
                value,
                last_used: self.clock,
            },
        );
    }
}

// ---------------------------------------------------------------------------
// User directory
// ---------------------------------------------------------------------------

/// Default capacity for the user lookup memo.
pub const USER_CACHE_CAPACITY: usize = 256;

/// Resolves user ids to display names for attribution, memoized through a
/// bounded [`LookupCache`].
pub struct UserDirectory {
    gateway: Arc<RestGateway>,
    users: LookupCache<DbId, User>,
}

impl UserDirectory {
    pub fn new(gateway: Arc<RestGateway>) -> Self {
        Self {
            gateway,
            users: LookupCache::new(USER_CACHE_CAPACITY),
        }
    }

    /// The user's display name, fetched once and cached. Unknown or
    /// nameless users fall back to `"User <id>"` so attribution never
    /// renders blank.
    pub async fn display_name(&mut self, id: DbId) -> Result<String, ApiError> {
        if let Some(user) = self.users.get(&id) {
            return Ok(display_name_of(user, id));
        }
        let user = self.gateway.user(id).await?;
        let name = display_name_of(&user, id);
        self.users.insert(id, user);
        Ok(name)
    }
}

fn display_name_of(user: &User, id: DbId) -> String {
    user.full_name
        .clone()
        .unwrap_or_else(|| format!("User {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_miss() {
        let mut cache: LookupCache<i64, &str> = LookupCache::new(2);
        cache.insert(1, "Anna");
        assert_eq!(cache.get(&1), Some(&"Anna"));
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let mut cache: LookupCache<i64, &str> = LookupCache::new(2);
        cache.insert(1, "Anna");
        cache.insert(2, "Boris");
        // Touch 1 so 2 becomes the eviction candidate.
        cache.get(&1);
        cache.insert(3, "Vera");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(&"Anna"));
        assert_eq!(cache.get(&3), Some(&"Vera"));
    }

    #[test]
    fn test_replacing_existing_key_does_not_evict() {
        let mut cache: LookupCache<i64, &str> = LookupCache::new(2);
        cache.insert(1, "Anna");
        cache.insert(2, "Boris");
        cache.insert(1, "Anna P.");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), Some(&"Anna P."));
        assert_eq!(cache.get(&2), Some(&"Boris"));
    }
}
