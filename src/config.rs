use crate::error::Error;
use crate::hash::RouteHasher;
use crate::key::SegmentKey;
use crate::router::is_valid_segment_count;
use std::hash::Hash;

/// Which digest to use for segment assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFunction {
    /// 32-bit FNV-1 (default, deterministic across builds and platforms).
    #[default]
    Fnv1,
    /// ahash with fixed keys (faster for long keys).
    AHash,
    /// fxhash (faster for short keys, potentially less distributed).
    #[cfg(feature = "fxhash")]
    FxHash,
}

impl From<HashFunction> for RouteHasher {
    fn from(hash_fn: HashFunction) -> Self {
        match hash_fn {
            HashFunction::Fnv1 => RouteHasher::Fnv1,
            HashFunction::AHash => RouteHasher::AHash,
            #[cfg(feature = "fxhash")]
            HashFunction::FxHash => RouteHasher::FxHash,
        }
    }
}

/// Configuration for a SegmentedMap instance.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) segment_count: usize,
    pub(crate) segment_capacity: usize,
    pub(crate) hash_function: HashFunction,
}

impl Config {
    /// Create a new config with defaults (16 segments, FNV-1, no pre-sizing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of segments. Must be a power of two in
    /// `1..=MAX_SEGMENTS`.
    pub fn segment_count(mut self, count: usize) -> Result<Self, Error> {
        if !is_valid_segment_count(count) {
            return Err(Error::InvalidSegmentCount(count));
        }
        self.segment_count = count;
        Ok(self)
    }

    /// Set the initial capacity of each segment. Total capacity will be
    /// approximately `segment_capacity * segment_count`.
    pub fn segment_capacity(mut self, capacity: usize) -> Self {
        self.segment_capacity = capacity;
        self
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.hash_function = hash_fn;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segment_count: 16,
            segment_capacity: 0,
            hash_function: HashFunction::Fnv1,
        }
    }
}

/// Builder for creating a SegmentedMap with custom configuration.
///
/// Unlike [`SegmentedMap::new`](crate::SegmentedMap::new), the builder
/// rejects segment counts that would otherwise be rounded.
#[derive(Debug, Clone, Default)]
pub struct SegmentedMapBuilder {
    config: Config,
}

impl SegmentedMapBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of segments. Must be a power of two in
    /// `1..=MAX_SEGMENTS`.
    pub fn segment_count(mut self, count: usize) -> Result<Self, Error> {
        self.config = self.config.segment_count(count)?;
        Ok(self)
    }

    /// Set the initial capacity of each segment.
    pub fn segment_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.segment_capacity(capacity);
        self
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.config = self.config.hash_function(hash_fn);
        self
    }

    /// Build a SegmentedMap with the configured settings.
    pub fn build<K, V>(self) -> Result<crate::SegmentedMap<K, V>, Error>
    where
        K: SegmentKey + Hash + Eq + Send + Sync,
        V: Send + Sync,
    {
        crate::SegmentedMap::with_config(self.config)
    }
}
