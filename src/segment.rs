use crate::segmented_map::Removal;
use crate::stats::{Counter, SegmentCounters, SegmentOps};
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::hash::Hash;

/// A single segment containing a HashMap protected by a read-write lock.
///
/// Every method takes the lock exactly once and releases it before returning,
/// except [`Segment::read_lock`] which hands the guard to the caller.
pub(crate) struct Segment<K, V> {
    map: RwLock<HashMap<K, V>>,
    counters: SegmentCounters,
}

impl<K, V> Segment<K, V>
where
    K: Hash + Eq,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: RwLock::new(HashMap::with_capacity(capacity)),
            counters: SegmentCounters::new(),
        }
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
        #[cfg(feature = "lock-timing")]
        let start = std::time::Instant::now();
        let guard = self.map.read();
        self.counters.add(Counter::LockAcquisition, 1);
        #[cfg(feature = "lock-timing")]
        self.counters
            .add(Counter::LockWait, start.elapsed().as_nanos() as u64);
        guard
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        #[cfg(feature = "lock-timing")]
        let start = std::time::Instant::now();
        let guard = self.map.write();
        self.counters.add(Counter::LockAcquisition, 1);
        #[cfg(feature = "lock-timing")]
        self.counters
            .add(Counter::LockWait, start.elapsed().as_nanos() as u64);
        guard
    }

    /// Insert a key-value pair, returning the previous value if any.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let previous = self.write().insert(key, value);
        self.counters.add(Counter::Write, 1);
        previous
    }

    /// Clone out the value for `key`.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let result = self.read().get(key).cloned();
        if result.is_some() {
            self.counters.add(Counter::Read, 1);
        }
        result
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.read().contains_key(key)
    }

    /// Remove a key-value pair, returning the value if it existed.
    pub fn remove(&self, key: &K) -> Option<V> {
        let result = self.write().remove(key);
        if result.is_some() {
            self.counters.add(Counter::Remove, 1);
        }
        result
    }

    /// Remove every listed key under a single write lock.
    pub fn remove_many<'k, I>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'k K>,
        K: 'k,
    {
        let removed = {
            let mut map = self.write();
            keys.into_iter()
                .filter(|key| map.remove(*key).is_some())
                .count()
        };
        self.counters.add(Counter::Remove, removed as u64);
        removed
    }

    /// Remove `key` only if `predicate` accepts its current value.
    pub fn remove_if<F>(&self, key: &K, predicate: F) -> Removal<V>
    where
        F: FnOnce(&V) -> bool,
    {
        let mut map = self.write();
        let Some(current) = map.get(key) else {
            return Removal::Absent;
        };
        if !predicate(current) {
            return Removal::Retained;
        }
        match map.remove(key) {
            Some(value) => {
                self.counters.add(Counter::Remove, 1);
                Removal::Removed(value)
            }
            None => Removal::Absent,
        }
    }

    /// Locked half of get-or-set: re-check, then create with `supplier`.
    pub fn get_or_insert_with<F>(&self, key: K, supplier: F) -> (V, bool)
    where
        F: FnOnce() -> V,
        V: Clone,
    {
        let mut map = self.write();
        match map.entry(key) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let value = entry.insert(supplier()).clone();
                self.counters.add(Counter::Write, 1);
                (value, true)
            }
        }
    }

    /// Store `f(current)`, or `f(default)` when the key is absent.
    pub fn update<F>(&self, key: K, default: V, f: F) -> (V, bool)
    where
        F: FnOnce(V) -> V,
        V: Clone,
    {
        let mut map = self.write();
        // The stored value is only replaced once `f` has returned.
        if let Some(slot) = map.get_mut(&key) {
            let value = f(slot.clone());
            *slot = value.clone();
            self.counters.add(Counter::Write, 1);
            return (value, false);
        }
        let value = f(default);
        map.insert(key, value.clone());
        self.counters.add(Counter::Write, 1);
        (value, true)
    }

    /// Store `f(current)` only if the key is present.
    pub fn update_existing<F>(&self, key: &K, f: F) -> Option<V>
    where
        F: FnOnce(V) -> V,
        V: Clone,
    {
        let mut map = self.write();
        let slot = map.get_mut(key)?;
        let value = f(slot.clone());
        *slot = value.clone();
        self.counters.add(Counter::Write, 1);
        Some(value)
    }

    /// Compute over the current value without touching storage.
    pub fn calculate<R, F>(&self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        let map = self.write();
        let current = map.get(key)?;
        self.counters.add(Counter::Read, 1);
        Some(f(current))
    }

    /// Visit entries until `visit` returns false. Returns false if stopped early.
    pub fn for_each_while<F>(&self, visit: &mut F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        let map = self.read();
        map.iter().all(|(key, value)| visit(key, value))
    }

    pub fn extend_keys(&self, out: &mut Vec<K>)
    where
        K: Clone,
    {
        out.extend(self.read().keys().cloned());
    }

    pub fn extend_values(&self, out: &mut Vec<V>)
    where
        V: Clone,
    {
        out.extend(self.read().values().cloned());
    }

    /// Get the number of entries in this segment.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if this segment is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop all entries, keeping the allocation.
    pub fn clear(&self) {
        let removed = {
            let mut map = self.write();
            let len = map.len();
            map.clear();
            len
        };
        self.counters.add(Counter::Remove, removed as u64);
    }

    /// Get a snapshot of statistics for this segment.
    pub fn stats(&self) -> SegmentOps {
        self.counters.snapshot()
    }

    /// Get a read lock for iteration purposes.
    pub fn read_lock(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let segment = Segment::with_capacity(4);
        assert_eq!(segment.insert("a", 1), None);
        assert_eq!(segment.insert("a", 2), Some(1));
        assert_eq!(segment.get(&"a"), Some(2));
        assert_eq!(segment.remove(&"a"), Some(2));
        assert_eq!(segment.get(&"a"), None);
        assert!(segment.is_empty());
    }

    #[test]
    fn test_remove_many_counts_only_present_keys() {
        let segment = Segment::with_capacity(0);
        segment.insert(1, "one");
        segment.insert(2, "two");
        assert_eq!(segment.remove_many([&1, &2, &3, &1]), 2);
        assert_eq!(segment.len(), 0);
    }

    #[test]
    fn test_remove_if_outcomes() {
        let segment = Segment::with_capacity(0);
        segment.insert(1, 10);
        assert_eq!(segment.remove_if(&1, |v| *v > 10), Removal::Retained);
        assert_eq!(segment.remove_if(&1, |v| *v == 10), Removal::Removed(10));
        assert_eq!(segment.remove_if(&1, |_| true), Removal::Absent);
    }

    #[test]
    fn test_update_existing_keeps_original_key() {
        let segment = Segment::with_capacity(0);
        assert_eq!(segment.update_existing(&"k", |v: i32| v + 1), None);
        segment.insert("k", 1);
        assert_eq!(segment.update_existing(&"k", |v| v + 1), Some(2));
        assert_eq!(segment.get(&"k"), Some(2));
        assert_eq!(segment.len(), 1);
    }

    #[test]
    fn test_panicking_update_keeps_stored_value() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let segment = Segment::with_capacity(0);
        segment.insert("k", 41);

        let result = catch_unwind(AssertUnwindSafe(|| {
            segment.update("k", 0, |_| panic!("update failed"))
        }));
        assert!(result.is_err());
        assert_eq!(segment.get(&"k"), Some(41));

        let result = catch_unwind(AssertUnwindSafe(|| {
            segment.update_existing(&"k", |_| panic!("update failed"))
        }));
        assert!(result.is_err());
        assert_eq!(segment.get(&"k"), Some(41));

        // An absent key stays absent when the closure panics on the default.
        let result = catch_unwind(AssertUnwindSafe(|| {
            segment.update("missing", 0, |_| panic!("update failed"))
        }));
        assert!(result.is_err());
        assert!(!segment.contains_key(&"missing"));
        assert_eq!(segment.len(), 1);
    }

    #[test]
    fn test_for_each_while_stops() {
        let segment = Segment::with_capacity(0);
        for i in 0..10 {
            segment.insert(i, i);
        }
        let mut seen = 0;
        let finished = segment.for_each_while(&mut |_, _| {
            seen += 1;
            seen < 3
        });
        assert!(!finished);
        assert_eq!(seen, 3);
    }

    #[test]
    fn test_clear() {
        let segment = Segment::with_capacity(0);
        segment.insert(1, 1);
        segment.insert(2, 2);
        segment.clear();
        assert!(segment.is_empty());
    }
}
