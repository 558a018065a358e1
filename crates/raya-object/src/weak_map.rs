//! Identity-keyed weak map
//!
//! Keys are held weakly: an entry is visible only while its key object is
//! alive, and dead entries are pruned as the map grows. Values are owned,
//! so a value that strongly references its own key keeps that entry alive
//! forever; store a [`WeakObjectRef`] instead when the value is an object.

use crate::object::{ObjectId, ObjectRef, WeakObjectRef};
use rustc_hash::FxHashMap;

struct Entry<V> {
    key: WeakObjectRef,
    value: V,
}

/// Map from object identity to `V`, not keeping keys alive
pub struct WeakObjectMap<V> {
    entries: FxHashMap<ObjectId, Entry<V>>,
    prune_at: usize,
}

const MIN_PRUNE_THRESHOLD: usize = 64;

impl<V> WeakObjectMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            prune_at: MIN_PRUNE_THRESHOLD,
        }
    }

    /// Value for `key`, if present
    pub fn get(&self, key: &ObjectRef) -> Option<&V> {
        self.entries
            .get(&key.id())
            .filter(|entry| entry.key.is_live())
            .map(|entry| &entry.value)
    }

    /// Check whether `key` has an entry
    pub fn contains_key(&self, key: &ObjectRef) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace the value for `key`
    pub fn insert(&mut self, key: &ObjectRef, value: V) -> Option<V> {
        if self.entries.len() >= self.prune_at {
            self.prune();
            self.prune_at = (self.entries.len() * 2).max(MIN_PRUNE_THRESHOLD);
        }
        self.entries
            .insert(
                key.id(),
                Entry {
                    key: key.downgrade(),
                    value,
                },
            )
            .map(|entry| entry.value)
    }

    /// Remove the entry for `key`
    pub fn remove(&mut self, key: &ObjectRef) -> Option<V> {
        self.entries.remove(&key.id()).map(|entry| entry.value)
    }

    /// Drop entries whose key has been collected
    pub fn prune(&mut self) {
        self.entries.retain(|_, entry| entry.key.is_live());
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.key.is_live())
            .count()
    }

    /// Check whether there are no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WeakObjectMap<WeakObjectRef> {
    /// Live object stored for `key`
    pub fn get_live(&self, key: &ObjectRef) -> Option<ObjectRef> {
        self.get(key).and_then(WeakObjectRef::upgrade)
    }
}

impl<V> Default for WeakObjectMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for WeakObjectMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakObjectMap")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_follows_key_lifetime() {
        let mut map = WeakObjectMap::new();
        let key = ObjectRef::new();
        map.insert(&key, 1);
        assert_eq!(map.get(&key), Some(&1));
        assert_eq!(map.len(), 1);
        drop(key);
        assert_eq!(map.len(), 0);
        map.prune();
        assert!(map.is_empty());
    }

    #[test]
    fn test_weak_values() {
        let mut map = WeakObjectMap::new();
        let key = ObjectRef::new();
        let value = ObjectRef::new();
        map.insert(&key, value.downgrade());
        assert!(map.get_live(&key).is_some_and(|v| v.ptr_eq(&value)));
        drop(value);
        assert!(map.get_live(&key).is_none());
    }

    #[test]
    fn test_prune_on_growth() {
        let mut map = WeakObjectMap::new();
        for _ in 0..200 {
            let key = ObjectRef::new();
            map.insert(&key, ());
        }
        assert!(map.entries.len() < 200);
        assert!(map.is_empty());
    }
}
