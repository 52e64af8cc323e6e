use crate::key::SegmentKey;
use std::hash::Hasher;

const FNV1_OFFSET: u32 = 0x811c_9dc5;
const FNV1_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1 (multiply, then xor) over a byte stream.
///
/// Note this is FNV-1, not FNV-1a: the routing contract depends on the
/// multiply happening before each byte is folded in.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1Hasher {
    state: u32,
}

impl Fnv1Hasher {
    /// Create a hasher seeded with the FNV offset basis.
    pub const fn new() -> Self {
        Self { state: FNV1_OFFSET }
    }

    /// The 32-bit digest of everything written so far.
    #[inline]
    pub const fn digest(&self) -> u32 {
        self.state
    }
}

impl Default for Fnv1Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = self.state.wrapping_mul(FNV1_PRIME);
            self.state ^= u32::from(byte);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.state)
    }
}

/// Digest implementation used for segment assignment.
/// Uses an enum to avoid trait object limitations with generics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteHasher {
    /// 32-bit FNV-1 (default, stable across builds and platforms).
    #[default]
    Fnv1,
    /// AHash with fixed keys (faster on long keys, not FNV-compatible).
    AHash,
    /// FxHash (fastest on short keys, potentially less distributed).
    #[cfg(feature = "fxhash")]
    FxHash,
}

impl RouteHasher {
    /// Digest a key's canonical encoding down to 32 bits.
    #[inline]
    pub fn digest<K: SegmentKey + ?Sized>(&self, key: &K) -> u32 {
        match self {
            RouteHasher::Fnv1 => {
                let mut hasher = Fnv1Hasher::new();
                key.write_canonical(&mut hasher);
                hasher.digest()
            }
            RouteHasher::AHash => {
                let mut hasher = ahash::AHasher::default();
                key.write_canonical(&mut hasher);
                hasher.finish() as u32
            }
            #[cfg(feature = "fxhash")]
            RouteHasher::FxHash => {
                let mut hasher = fxhash::FxHasher32::default();
                key.write_canonical(&mut hasher);
                hasher.finish() as u32
            }
        }
    }
}
