//! # segmap
//!
//! A concurrent map striped across independently locked segments.
//!
//! Keys are routed to one of N segments by a deterministic 32-bit FNV-1
//! digest of their canonical byte encoding. Each segment is a `HashMap`
//! behind its own reader-writer lock, so operations on different segments
//! never block one another, and readers of the same segment proceed in
//! parallel.
//!
//! ## Features
//!
//! - **Lock striping**: one `RwLock` per segment, power-of-two segment counts
//! - **Deterministic routing**: the same key maps to the same segment in every
//!   process, on every platform
//! - **Compile-time key checking**: only [`SegmentKey`] types can be routed
//! - **Deadlock-free**: a thread never holds more than one segment lock
//! - **Statistics**: per-segment sizes and, with `metrics`, operation counters
//!
//! ## Example
//!
//! ```rust
//! use segmap::{Removal, SegmentedMap};
//!
//! let map = SegmentedMap::new(16, 64);
//!
//! map.set("key1", 1);
//! map.set("key2", 2);
//!
//! if let Some(value) = map.get(&"key1") {
//!     println!("Found: {}", value);
//! }
//!
//! // Read-modify-write under the segment lock
//! map.update("key1", 0, |v| v + 10);
//!
//! // Create only if absent
//! assert_eq!(map.get_or_set("key3", || 3), (3, true));
//!
//! // Conditional removal reports what happened
//! assert_eq!(map.delete_if(&"key2", |v| *v > 100), Removal::Retained);
//!
//! // Walk entries segment by segment
//! map.range(|key, value| {
//!     println!("{}: {}", key, value);
//!     true
//! });
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use segmap::{HashFunction, SegmentedMapBuilder};
//!
//! let map = SegmentedMapBuilder::new()
//!     .segment_count(32)?  // Must be power of two
//!     .segment_capacity(128)
//!     .hash_function(HashFunction::Fnv1)
//!     .build::<String, i32>()?;
//! # Ok::<(), segmap::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Configuration and builder types.
pub mod config;
/// Error types.
pub mod error;
/// Digest functions for segment routing.
pub mod hash;
/// Iterator implementations.
pub mod iter;
pub mod key;
/// Key-to-segment routing.
pub mod router;
/// Internal segment implementation.
mod segment;
/// Main SegmentedMap implementation.
pub mod segmented_map;
pub mod stats;

// Re-export main types
pub use config::{Config, HashFunction, SegmentedMapBuilder};
pub use error::Error;
pub use key::{F32Key, F64Key, SegmentKey};
pub use router::{SegmentRouter, MAX_SEGMENTS};
pub use segmented_map::{Removal, SegmentedMap};
pub use stats::{SegmentOps, Stats};
