//! Append-only resource stores with keyed dedup tables.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Index-addressed store with a key→index side table.
///
/// Entries are only ever appended, so an index handed out once stays valid
/// for the lifetime of the store. The side table only decides which index a
/// key resolves to; it never owns the entries.
#[derive(Debug, Clone)]
pub struct NamedStore<K, T> {
    items: Vec<T>,
    index: HashMap<K, usize>,
}

impl<K, T> Default for NamedStore<K, T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, T> NamedStore<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` and binds `key` to it, replacing any earlier binding.
    ///
    /// The earlier entry stays addressable by its index.
    pub fn push(&mut self, key: K, item: T) -> usize {
        let id = self.items.len();
        self.items.push(item);
        self.index.insert(key, id);
        id
    }

    /// Returns the index bound to `key`, loading and appending the entry on first use.
    ///
    /// `load` runs at most once per key; a failed load leaves the store untouched.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        load: impl FnOnce() -> Result<T, E>,
    ) -> Result<usize, E> {
        if let Some(&id) = self.index.get(&key) {
            return Ok(id);
        }
        let item = load()?;
        Ok(self.push(key, item))
    }

    /// Resolves a key to its current index.
    pub fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(key).copied()
    }

    /// Resolves a key to its current entry.
    pub fn lookup<Q>(&self, key: &Q) -> Option<&T>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index_of(key).map(|id| &self.items[id])
    }

    pub fn get(&self, id: usize) -> Option<&T> {
        self.items.get(id)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_rebinds_key_but_keeps_old_entry() {
        let mut store = NamedStore::new();
        assert_eq!(store.push("red".to_string(), 1), 0);
        assert_eq!(store.push("red".to_string(), 2), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.index_of("red"), Some(1));
        assert_eq!(store.lookup("red"), Some(&2));
        assert_eq!(store.get(0), Some(&1));
    }

    #[test]
    fn loader_runs_once_per_key() {
        let mut store: NamedStore<String, u32> = NamedStore::new();
        let mut calls = 0;
        for _ in 0..3 {
            let id = store
                .get_or_try_insert_with("brick.png".to_string(), || {
                    calls += 1;
                    Ok::<_, ()>(7)
                })
                .unwrap();
            assert_eq!(id, 0);
        }
        assert_eq!(calls, 1);
        assert_eq!(store.items(), &[7]);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let mut store: NamedStore<String, u32> = NamedStore::new();
        assert!(store
            .get_or_try_insert_with("broken".to_string(), || Err("nope"))
            .is_err());
        assert!(store.is_empty());
        assert_eq!(store.index_of("broken"), None);
    }
}
