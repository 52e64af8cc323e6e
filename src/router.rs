use crate::config::HashFunction;
use crate::hash::RouteHasher;
use crate::key::SegmentKey;

/// Upper bound on the number of segments a router will address.
pub const MAX_SEGMENTS: usize = 1 << 16;

/// Deterministic key-to-segment assignment.
///
/// The router digests a key's canonical encoding and keeps the low bits under
/// a mask of `2^floor(log2(segment_count)) - 1`. It holds no mutable state, so
/// a shared reference can route from any number of threads, and two routers
/// built with the same arguments agree on every key.
///
/// # Example
///
/// ```rust
/// use segmap::SegmentRouter;
///
/// let router = SegmentRouter::new(8);
/// assert_eq!(router.route("test-1"), 3);
/// assert_eq!(router.route(&1i32), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRouter {
    segment_count: usize,
    mask: usize,
    hasher: RouteHasher,
}

impl SegmentRouter {
    /// Create an FNV-1 router for `segment_count` segments.
    ///
    /// Counts of 0 and 1 yield a single segment. Other counts that are not
    /// powers of two are rounded down, and counts above [`MAX_SEGMENTS`] are
    /// clamped; both cases are logged as warnings.
    pub fn new(segment_count: usize) -> Self {
        Self::with_hash_function(segment_count, HashFunction::default())
    }

    /// Create a router using the given digest function.
    pub fn with_hash_function(segment_count: usize, hash_function: HashFunction) -> Self {
        let effective = effective_segment_count(segment_count);
        if effective != segment_count.max(1) {
            tracing::warn!(
                requested = segment_count,
                effective,
                "segment count is not a power of two in 1..={}, using {}",
                MAX_SEGMENTS,
                effective
            );
        }

        Self {
            segment_count: effective,
            mask: effective - 1,
            hasher: hash_function.into(),
        }
    }

    /// Figure out which segment this key belongs to.
    #[inline]
    pub fn route<K: SegmentKey + ?Sized>(&self, key: &K) -> usize {
        (self.hasher.digest(key) as usize) & self.mask
    }

    /// Number of segments keys are routed across.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Bitmask applied to the digest.
    #[inline]
    pub fn mask(&self) -> usize {
        self.mask
    }
}

/// `2^floor(log2(n))`, treating 0 as 1 and capping at [`MAX_SEGMENTS`].
pub(crate) fn effective_segment_count(requested: usize) -> usize {
    let bounded = requested.clamp(1, MAX_SEGMENTS);
    1 << bounded.ilog2()
}

/// Strict check used by the config builder.
pub(crate) fn is_valid_segment_count(count: usize) -> bool {
    count.is_power_of_two() && count <= MAX_SEGMENTS
}
