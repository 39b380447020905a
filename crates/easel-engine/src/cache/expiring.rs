use std::collections::HashMap;
use std::hash::Hash;

struct Entry<V> {
    value: V,
    ttl: u32,
}

/// Keyed store whose entries expire after a fixed number of frames.
///
/// Lifetimes are counted in [`tick`](Self::tick) calls. A lookup hit does **not**
/// refresh the remaining lifetime: an entry inserted with `ttl = k` is visible for
/// the `k` frames following the insert and evicted on the `k`-th tick, however
/// often it was read. This bounds memory for call patterns that produce many
/// one-off keys (e.g. distinct strings) at the cost of periodically rebuilding hot
/// entries.
pub struct ExpiringCache<K, V> {
    entries: HashMap<K, Entry<V>>,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Remaining ticks before `key` is evicted.
    #[inline]
    pub fn remaining(&self, key: &K) -> Option<u32> {
        self.entries.get(key).map(|e| e.ttl)
    }

    /// Inserts `value` with `ttl` frames to live, replacing any previous entry.
    ///
    /// The replaced value, if any, is returned so its owner can release it.
    /// A `ttl` of zero stores nothing and hands `value` back.
    pub fn insert(&mut self, key: K, value: V, ttl: u32) -> Option<V> {
        if ttl == 0 {
            return Some(value);
        }
        self.entries.insert(key, Entry { value, ttl }).map(|e| e.value)
    }

    /// Ages every entry by one frame, evicting those that reach zero.
    pub fn tick<F>(&mut self, mut on_evict: F)
    where
        K: Clone,
        F: FnMut(K, V),
    {
        let mut expired: Vec<K> = Vec::new();
        for (key, entry) in self.entries.iter_mut() {
            entry.ttl = entry.ttl.saturating_sub(1);
            if entry.ttl == 0 {
                expired.push(key.clone());
            }
        }
        for key in expired {
            if let Some((key, entry)) = self.entries.remove_entry(&key) {
                on_evict(key, entry.value);
            }
        }
    }

    /// Evicts everything.
    pub fn clear<F>(&mut self, mut on_evict: F)
    where
        F: FnMut(K, V),
    {
        for (key, entry) in self.entries.drain() {
            on_evict(key, entry.value);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_collect(cache: &mut ExpiringCache<&'static str, u32>) -> Vec<u32> {
        let mut out = Vec::new();
        cache.tick(|_, v| out.push(v));
        out
    }

    // ── ttl ───────────────────────────────────────────────────────────────

    #[test]
    fn entry_lives_for_exactly_ttl_ticks() {
        let mut cache = ExpiringCache::new();
        cache.insert("a", 1u32, 3);

        assert_eq!(cache.get(&"a"), Some(&1));
        assert!(tick_collect(&mut cache).is_empty());
        assert_eq!(cache.get(&"a"), Some(&1));
        assert!(tick_collect(&mut cache).is_empty());
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(tick_collect(&mut cache), vec![1]);
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn hit_does_not_refresh_lifetime() {
        let mut cache = ExpiringCache::new();
        cache.insert("a", 7u32, 2);
        for _ in 0..10 {
            assert!(cache.get(&"a").is_some());
        }
        assert_eq!(cache.remaining(&"a"), Some(2));
        cache.tick(|_, _| {});
        assert_eq!(cache.remaining(&"a"), Some(1));
        cache.tick(|_, _| {});
        assert!(cache.get(&"a").is_none());
    }

    #[test]
    fn entries_age_independently() {
        let mut cache = ExpiringCache::new();
        cache.insert("short", 1u32, 1);
        cache.insert("long", 2u32, 5);
        assert_eq!(tick_collect(&mut cache), vec![1]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"long"), Some(&2));
    }

    #[test]
    fn zero_ttl_is_not_stored() {
        let mut cache = ExpiringCache::new();
        assert_eq!(cache.insert("a", 5u32, 0), Some(5));
        assert!(cache.is_empty());
    }

    #[test]
    fn reinsert_returns_previous_value() {
        let mut cache = ExpiringCache::new();
        assert_eq!(cache.insert("a", 1u32, 4), None);
        assert_eq!(cache.insert("a", 2u32, 4), Some(1));
        assert_eq!(cache.get(&"a"), Some(&2));
    }

    // ── clear ─────────────────────────────────────────────────────────────

    #[test]
    fn clear_evicts_everything() {
        let mut cache = ExpiringCache::new();
        cache.insert("a", 1u32, 10);
        cache.insert("b", 2u32, 10);
        let mut evicted = Vec::new();
        cache.clear(|_, v| evicted.push(v));
        evicted.sort();
        assert_eq!(evicted, vec![1, 2]);
        assert!(cache.is_empty());
    }
}
