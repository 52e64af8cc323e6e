use crate::config::Config;
use crate::error::Error;
use crate::iter::Iter;
use crate::key::SegmentKey;
use crate::router::{is_valid_segment_count, SegmentRouter};
use crate::segment::Segment;
use crate::stats::{SegmentOps, Stats};
use std::hash::Hash;

/// Outcome of [`SegmentedMap::delete_if`].
///
/// `Removed` is returned if and only if the entry was removed; `Retained`
/// and `Absent` tell apart a rejecting predicate from a missing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal<V> {
    /// The predicate accepted the value and the entry was removed.
    Removed(V),
    /// The key was present but the predicate rejected its value.
    Retained,
    /// The key was not present; the predicate was not called.
    Absent,
}

impl<V> Removal<V> {
    /// Whether the entry was removed.
    pub fn is_removed(&self) -> bool {
        matches!(self, Removal::Removed(_))
    }

    /// Whether the key was present, regardless of the predicate.
    pub fn existed(&self) -> bool {
        !matches!(self, Removal::Absent)
    }

    /// The removed value, if any.
    pub fn into_removed(self) -> Option<V> {
        match self {
            Removal::Removed(value) => Some(value),
            Removal::Retained | Removal::Absent => None,
        }
    }
}

/// Concurrent map striped across independently locked segments.
///
/// Every key is routed to exactly one segment by a [`SegmentRouter`]; each
/// segment is a `HashMap` behind its own reader-writer lock, so operations on
/// different segments never block one another. A calling thread holds at
/// most one segment lock at any moment: whole-map operations (`len`, `keys`,
/// `values`, `range`, multi-key `delete`) lock, work and unlock one segment
/// before moving to the next. That rules out deadlock, and it also means
/// whole-map results are not point-in-time snapshots while writers are
/// active.
///
/// # Example
///
/// ```rust
/// use segmap::SegmentedMap;
///
/// let map = SegmentedMap::new(8, 16);
/// map.set("key1", 1);
///
/// assert_eq!(map.get(&"key1"), Some(1));
/// assert_eq!(map.update("key1", 0, |v| v + 1), (2, false));
/// assert_eq!(map.get_and_delete(&"key1"), Some(2));
/// assert!(map.is_empty());
/// ```
pub struct SegmentedMap<K, V> {
    segments: Box<[Segment<K, V>]>,
    router: SegmentRouter,
}

impl<K, V> SegmentedMap<K, V>
where
    K: SegmentKey + Hash + Eq + Send + Sync,
    V: Send + Sync,
{
    /// Create a map with `segment_count` segments, each pre-sized for
    /// `segment_capacity` entries.
    ///
    /// Counts of 0 and 1 give a single unsegmented map. A count that is not a
    /// power of two is rounded down (with a warning); use
    /// [`SegmentedMapBuilder`](crate::SegmentedMapBuilder) to reject such
    /// counts instead.
    pub fn new(segment_count: usize, segment_capacity: usize) -> Self {
        Self::from_router(SegmentRouter::new(segment_count), segment_capacity)
    }

    /// Create a single-segment map. Same API, no striping.
    pub fn unsegmented() -> Self {
        Self::new(1, 1)
    }

    /// Create a new map with custom config.
    pub fn with_config(config: Config) -> Result<Self, Error> {
        if !is_valid_segment_count(config.segment_count) {
            return Err(Error::InvalidSegmentCount(config.segment_count));
        }

        let router =
            SegmentRouter::with_hash_function(config.segment_count, config.hash_function);
        Ok(Self::from_router(router, config.segment_capacity))
    }

    fn from_router(router: SegmentRouter, segment_capacity: usize) -> Self {
        let segments = (0..router.segment_count())
            .map(|_| Segment::with_capacity(segment_capacity))
            .collect();

        tracing::debug!(
            segments = router.segment_count(),
            mask = router.mask(),
            segment_capacity,
            "created segmented map"
        );

        Self { segments, router }
    }

    #[inline]
    fn segment(&self, key: &K) -> &Segment<K, V> {
        &self.segments[self.router.route(key)]
    }

    /// Index of the segment that owns `key`.
    #[inline]
    pub fn segment_index(&self, key: &K) -> usize {
        self.router.route(key)
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The router assigning keys to segments.
    pub fn router(&self) -> &SegmentRouter {
        &self.router
    }

    /// Insert or overwrite a value. Returns the previous value if the key
    /// existed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use segmap::SegmentedMap;
    ///
    /// let map = SegmentedMap::new(4, 0);
    /// assert_eq!(map.set("key", "value"), None);
    /// assert_eq!(map.set("key", "new_value"), Some("value"));
    /// ```
    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.segment(&key).insert(key, value)
    }

    /// Get a clone of the value for `key`, or `None` if absent.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.segment(key).get(key)
    }

    /// Check if a key exists without cloning the value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.segment(key).contains_key(key)
    }

    /// Remove every listed key, returning how many were present.
    ///
    /// Keys are grouped by segment and each implicated segment is write-locked
    /// once, in index order. Removal is atomic within a segment but not across
    /// segments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use segmap::SegmentedMap;
    ///
    /// let map = SegmentedMap::new(4, 0);
    /// map.set(1, "a");
    /// map.set(2, "b");
    /// assert_eq!(map.delete([&1, &2, &3]), 2);
    /// assert!(map.is_empty());
    /// ```
    pub fn delete<'k, I>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'k K>,
        K: 'k,
    {
        let mut routed: Vec<(usize, &K)> = keys
            .into_iter()
            .map(|key| (self.router.route(key), key))
            .collect();
        routed.sort_unstable_by_key(|(index, _)| *index);

        let mut removed = 0;
        let mut start = 0;
        while start < routed.len() {
            let index = routed[start].0;
            let end = routed[start..]
                .iter()
                .position(|(other, _)| *other != index)
                .map_or(routed.len(), |offset| start + offset);
            let keys = routed[start..end].iter().map(|(_, key)| *key);
            removed += self.segments[index].remove_many(keys);
            start = end;
        }
        removed
    }

    /// Remove `key` if `predicate` returns true for its current value.
    ///
    /// The predicate runs under the segment's write lock, so no other thread
    /// can change the value between the check and the removal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use segmap::{Removal, SegmentedMap};
    ///
    /// let map = SegmentedMap::new(4, 0);
    /// map.set("k", 10);
    /// assert_eq!(map.delete_if(&"k", |v| *v > 10), Removal::Retained);
    /// assert_eq!(map.delete_if(&"k", |v| *v == 10), Removal::Removed(10));
    /// assert_eq!(map.delete_if(&"k", |_| true), Removal::Absent);
    /// ```
    pub fn delete_if<F>(&self, key: &K, predicate: F) -> Removal<V>
    where
        F: FnOnce(&V) -> bool,
    {
        self.segment(key).remove_if(key, predicate)
    }

    /// Get the total number of entries across all segments.
    ///
    /// Note: segments are counted one after another, so the total can be
    /// stale under concurrent writes.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|segment| segment.len()).sum()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|segment| segment.is_empty())
    }

    /// All keys, segment by segment in index order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut keys = Vec::new();
        for segment in self.segments.iter() {
            segment.extend_keys(&mut keys);
        }
        keys
    }

    /// All values, segment by segment in index order.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        let mut values = Vec::new();
        for segment in self.segments.iter() {
            segment.extend_values(&mut values);
        }
        values
    }

    /// Get the value for `key`, creating it with `supplier` if absent.
    /// Returns the value and whether it was created by this call.
    ///
    /// The first lookup only takes a read lock. On a miss the segment is
    /// write-locked and re-checked before `supplier` runs, so concurrent
    /// callers racing on the same absent key invoke `supplier` exactly once
    /// and all observe the same value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use segmap::SegmentedMap;
    ///
    /// let map = SegmentedMap::new(4, 0);
    /// assert_eq!(map.get_or_set(0, || "abc"), ("abc", true));
    /// assert_eq!(map.get_or_set(0, || "xyz"), ("abc", false));
    /// ```
    pub fn get_or_set<F>(&self, key: K, supplier: F) -> (V, bool)
    where
        F: FnOnce() -> V,
        V: Clone,
    {
        let segment = self.segment(&key);
        if let Some(value) = segment.get(&key) {
            return (value, false);
        }
        segment.get_or_insert_with(key, supplier)
    }

    /// Remove `key` and return its value, if it existed.
    pub fn get_and_delete(&self, key: &K) -> Option<V> {
        self.segment(key).remove(key)
    }

    /// Store `f(current)`, or `f(default)` if the key is absent. Returns the
    /// stored value and whether the entry was created. `f` runs exactly once.
    ///
    /// # Example
    ///
    /// ```rust
    /// use segmap::SegmentedMap;
    ///
    /// let map = SegmentedMap::new(4, 0);
    /// map.update("counter", 0, |v| v + 1);
    /// assert_eq!(map.update("counter", 0, |v| v + 1), (2, false));
    /// ```
    pub fn update<F>(&self, key: K, default: V, f: F) -> (V, bool)
    where
        F: FnOnce(V) -> V,
        V: Clone,
    {
        self.segment(&key).update(key, default, f)
    }

    /// Store `f(current)` only if the key exists, returning the new value.
    /// `f` is not called for an absent key.
    pub fn update_existing<F>(&self, key: &K, f: F) -> Option<V>
    where
        F: FnOnce(V) -> V,
        V: Clone,
    {
        self.segment(key).update_existing(key, f)
    }

    /// Compute a result from the current value without modifying it.
    ///
    /// Runs under the segment's write lock, so `f` observes the value
    /// exclusively.
    pub fn calculate<R, F>(&self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        self.segment(key).calculate(key, f)
    }

    /// Visit entries segment by segment until `visit` returns false.
    ///
    /// Each segment is read-locked only while its own entries are visited, so
    /// segments not yet reached may change during the walk.
    ///
    /// # Example
    ///
    /// ```rust
    /// use segmap::SegmentedMap;
    ///
    /// let map = SegmentedMap::new(4, 0);
    /// for i in 0..10 {
    ///     map.set(i, i);
    /// }
    ///
    /// let mut visited = 0;
    /// map.range(|_, _| {
    ///     visited += 1;
    ///     visited < 3
    /// });
    /// assert_eq!(visited, 3);
    /// ```
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for segment in self.segments.iter() {
            if !segment.for_each_while(&mut visit) {
                return;
            }
        }
    }

    /// Remove all entries, one segment at a time.
    pub fn clear(&self) {
        for segment in self.segments.iter() {
            segment.clear();
        }
    }

    /// Iterate over cloned entries, buffering one segment at a time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use segmap::SegmentedMap;
    ///
    /// let map = SegmentedMap::new(4, 0);
    /// map.set("key1", "value1");
    /// map.set("key2", "value2");
    /// assert_eq!(map.iter().count(), 2);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V>
    where
        K: Clone,
        V: Clone,
    {
        Iter::new(&self.segments)
    }

    /// Get detailed statistics about the map and its segments.
    pub fn stats(&self) -> Stats {
        let segment_sizes: Vec<usize> = self.segments.iter().map(|s| s.len()).collect();
        let operations: Vec<SegmentOps> = self.segments.iter().map(|s| s.stats()).collect();
        let size: usize = segment_sizes.iter().sum();

        Stats {
            size,
            segment_sizes,
            operations,
        }
    }
}

impl<K, V> Default for SegmentedMap<K, V>
where
    K: SegmentKey + Hash + Eq + Send + Sync,
    V: Send + Sync,
{
    fn default() -> Self {
        let config = Config::default();
        let router =
            SegmentRouter::with_hash_function(config.segment_count, config.hash_function);
        Self::from_router(router, config.segment_capacity)
    }
}
