//! A small bounded LRU over an insertion-ordered map: most recently used
//! at the back, eviction from the front. Lookups are O(n) shifts, which is
//! fine at the capacities style caches run at.

use indexmap::IndexMap;

#[derive(Debug)]
pub(crate) struct LruCache<V> {
  capacity: usize,
  entries: IndexMap<String, V>,
}

impl<V: Clone> LruCache<V> {
  pub(crate) fn new(capacity: usize) -> Self {
    LruCache {
      capacity,
      entries: IndexMap::new(),
    }
  }

  /// A hit re-inserts the entry as most recently used.
  pub(crate) fn get(&mut self, key: &str) -> Option<V> {
    let value = self.entries.shift_remove(key)?;
    let _ = self.entries.insert(key.to_string(), value.clone());
    Some(value)
  }

  pub(crate) fn insert(&mut self, key: String, value: V) {
    if self.capacity == 0 {
      return;
    }
    if self.entries.shift_remove(&key).is_none() && self.entries.len() == self.capacity {
      let _ = self.entries.shift_remove_index(0);
    }
    let _ = self.entries.insert(key, value);
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn evicts_least_recently_used_at_capacity() {
    let mut cache = LruCache::new(2);
    cache.insert("a".into(), 1);
    cache.insert("b".into(), 2);
    cache.insert("c".into(), 3);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("b"), Some(2));
    assert_eq!(cache.get("c"), Some(3));
  }

  #[test]
  fn a_hit_refreshes_recency() {
    let mut cache = LruCache::new(2);
    cache.insert("a".into(), 1);
    cache.insert("b".into(), 2);
    assert_eq!(cache.get("a"), Some(1));
    cache.insert("c".into(), 3);

    // `b` was the least recently used after the `a` hit.
    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("a"), Some(1));
  }

  #[test]
  fn reinserting_an_existing_key_does_not_evict() {
    let mut cache = LruCache::new(2);
    cache.insert("a".into(), 1);
    cache.insert("b".into(), 2);
    cache.insert("a".into(), 10);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a"), Some(10));
    assert_eq!(cache.get("b"), Some(2));
  }

  #[test]
  fn zero_capacity_disables_caching() {
    let mut cache = LruCache::new(0);
    cache.insert("a".into(), 1);
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.get("a"), None);
  }
}
