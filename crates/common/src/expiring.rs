//! Thread-safe map from key to expiry deadline.
//!
//! Used by plugins that remember something for a while: recently sent
//! messages, silenced channels, outage notifications already delivered.
//! Expired entries are purged lazily on access, so no timer task is needed
//! per entry.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::Mutex,
    time::{Duration, Instant},
};

use tracing::{trace, warn};

/// Deadline used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// `now + ttl`, clamped to [`FAR_FUTURE`] on overflow.
fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| {
        warn!(ttl_secs = ttl.as_secs(), "ttl overflows the clock, clamping");
        now.checked_add(FAR_FUTURE).unwrap_or(now)
    })
}

/// Key -> deadline map. The lock is never held across an `.await`.
#[derive(Debug)]
pub struct ExpiringMap<K> {
    entries: Mutex<HashMap<K, Instant>>,
}

impl<K: Eq + Hash + Clone> Default for ExpiringMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> ExpiringMap<K> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record `key` until `now + ttl`. Last write wins.
    pub fn insert(&self, key: K, ttl: Duration) -> Instant {
        self.insert_at(key, Instant::now(), ttl)
    }

    pub fn insert_at(&self, key: K, now: Instant, ttl: Duration) -> Instant {
        let until = deadline(now, ttl);
        self.lock().insert(key, until);
        until
    }

    /// Record `key` with an absolute deadline.
    pub fn insert_until(&self, key: K, until: Instant) {
        self.lock().insert(key, until);
    }

    /// Deadline of a live entry, if any.
    pub fn get(&self, key: &K) -> Option<Instant> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &K, now: Instant) -> Option<Instant> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(&until) if until > now => Some(until),
            Some(_) => {
                entries.remove(key);
                None
            },
            None => None,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn contains_at(&self, key: &K, now: Instant) -> bool {
        self.get_at(key, now).is_some()
    }

    /// Atomically check and record: returns `false` (and leaves the entry
    /// untouched) when a live entry exists, otherwise records `key` and
    /// returns `true`.
    pub fn insert_if_absent_at(&self, key: K, now: Instant, ttl: Duration) -> bool {
        let mut entries = self.lock();
        if entries.get(&key).is_some_and(|&until| until > now) {
            return false;
        }
        entries.insert(key, deadline(now, ttl));
        true
    }

    pub fn insert_if_absent(&self, key: K, ttl: Duration) -> bool {
        self.insert_if_absent_at(key, Instant::now(), ttl)
    }

    pub fn remove(&self, key: &K) -> Option<Instant> {
        self.lock().remove(key)
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, until| *until > now);
        let purged = before - entries.len();
        if purged > 0 {
            trace!(purged, remaining = entries.len(), "expired entries purged");
        }
        purged
    }

    /// Number of stored entries, including ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, Instant>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn live_entry_is_found() {
        let map = ExpiringMap::new();
        let now = Instant::now();
        let until = map.insert_at("#ops-web", now, 5 * MINUTE);
        assert_eq!(map.get_at(&"#ops-web", now + MINUTE), Some(until));
        assert!(map.contains_at(&"#ops-web", now));
    }

    #[test]
    fn expired_entry_is_purged_on_access() {
        let map = ExpiringMap::new();
        let now = Instant::now();
        map.insert_at("k", now, MINUTE);
        assert!(!map.contains_at(&"k", now + MINUTE));
        assert!(map.is_empty());
    }

    #[test]
    fn last_write_wins() {
        let map = ExpiringMap::new();
        let now = Instant::now();
        map.insert_at("k", now, MINUTE);
        map.insert_at("k", now, 10 * MINUTE);
        assert!(map.contains_at(&"k", now + 5 * MINUTE));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn insert_if_absent_only_records_once() {
        let map = ExpiringMap::new();
        let now = Instant::now();
        assert!(map.insert_if_absent_at(7_u64, now, MINUTE));
        assert!(!map.insert_if_absent_at(7_u64, now + Duration::from_secs(30), MINUTE));
        assert!(map.insert_if_absent_at(7_u64, now + MINUTE, MINUTE));
    }

    #[test]
    fn purge_removes_only_expired() {
        let map = ExpiringMap::new();
        let now = Instant::now();
        map.insert_at("short", now, MINUTE);
        map.insert_at("long", now, 10 * MINUTE);
        assert_eq!(map.purge_expired_at(now + 2 * MINUTE), 1);
        assert_eq!(map.len(), 1);
        assert!(map.remove(&"long").is_some());
    }

    #[test]
    fn huge_ttl_clamps_instead_of_overflowing() {
        let map = ExpiringMap::new();
        let now = Instant::now();
        let until = map.insert_at("forever", now, Duration::MAX);
        assert!(until > now);
        assert!(map.contains_at(&"forever", now + 1000 * MINUTE));
        assert!(map.insert_if_absent_at("other", now, Duration::MAX));
        assert!(!map.insert_if_absent_at("other", now + MINUTE, Duration::MAX));
    }
}
