//! Key-value storage for per-user records.

use std::collections::HashMap;
use std::hash::Hash;

/// Minimal record store keyed per entity. Writes replace.
pub trait KvStore<K, V> {
    fn get(&self, key: &K) -> Option<&V>;
    fn get_mut(&mut self, key: &K) -> Option<&mut V>;
    /// Insert or replace, returning the previous value.
    fn put(&mut self, key: K, value: V) -> Option<V>;
    fn delete(&mut self, key: &K) -> Option<V>;

    fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}

/// In-process store backed by a `HashMap`.
#[derive(Debug)]
pub struct MemoryStore<K, V> {
    records: HashMap<K, V>,
}

impl<K, V> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> MemoryStore<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record for which `keep` returns false.
    pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        self.records.retain(keep);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.records.iter()
    }
}

impl<K: Eq + Hash, V> KvStore<K, V> for MemoryStore<K, V> {
    fn get(&self, key: &K) -> Option<&V> {
        self.records.get(key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.records.get_mut(key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.records.insert(key, value)
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        self.records.remove(key)
    }
}
