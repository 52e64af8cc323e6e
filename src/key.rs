//! Canonical key encodings used for segment routing.
//!
//! Routing never goes through [`std::hash::Hash`]: its encodings are not
//! stable across types (`str` appends a terminator byte, integers use native
//! endianness). Every key type instead writes an explicit little-endian byte
//! sequence, so the same key lands in the same segment on every platform.

use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

/// A key type with a canonical byte encoding for segment routing.
///
/// Only types implementing this trait can be routed; using any other key type
/// is a compile error.
pub trait SegmentKey {
    /// Write the canonical encoding of `self` into `state`.
    fn write_canonical<H: Hasher>(&self, state: &mut H);
}

impl SegmentKey for str {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        state.write(self.as_bytes());
    }
}

impl SegmentKey for String {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        self.as_str().write_canonical(state);
    }
}

impl SegmentKey for Cow<'_, str> {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        (**self).write_canonical(state);
    }
}

impl<T: SegmentKey + ?Sized> SegmentKey for &T {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        (**self).write_canonical(state);
    }
}

impl<T: SegmentKey + ?Sized> SegmentKey for Box<T> {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        (**self).write_canonical(state);
    }
}

impl<T: SegmentKey + ?Sized> SegmentKey for Arc<T> {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        (**self).write_canonical(state);
    }
}

impl<T: SegmentKey + ?Sized> SegmentKey for Rc<T> {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        (**self).write_canonical(state);
    }
}

macro_rules! impl_segment_key_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl SegmentKey for $t {
                #[inline]
                fn write_canonical<H: Hasher>(&self, state: &mut H) {
                    state.write(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_segment_key_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

// Pointer-sized integers are widened so routing doesn't depend on the target.
impl SegmentKey for isize {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        (*self as i64).write_canonical(state);
    }
}

impl SegmentKey for usize {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        (*self as u64).write_canonical(state);
    }
}

/// Bit pattern plus truncated integer part, wrapped to 32 bits.
impl SegmentKey for f32 {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        let mixed = self.to_bits().wrapping_add(*self as i64 as u32);
        state.write(&mixed.to_le_bytes());
    }
}

/// Same mixing as `f32` but over the full 64-bit pattern, so distinct `f64`
/// values that share an `f32` rounding still encode differently.
impl SegmentKey for f64 {
    #[inline]
    fn write_canonical<H: Hasher>(&self, state: &mut H) {
        let mixed = self.to_bits().wrapping_add(*self as i64 as u64);
        state.write(&mixed.to_le_bytes());
    }
}

macro_rules! float_key {
    ($(#[$doc:meta])* $name:ident, $float:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name(pub $float);

        impl $name {
            /// The wrapped float.
            #[inline]
            pub const fn get(self) -> $float {
                self.0
            }
        }

        impl PartialEq for $name {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.0.to_bits() == other.0.to_bits()
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            #[inline]
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.to_bits().hash(state);
            }
        }

        impl SegmentKey for $name {
            #[inline]
            fn write_canonical<H: Hasher>(&self, state: &mut H) {
                self.0.write_canonical(state);
            }
        }

        impl From<$float> for $name {
            #[inline]
            fn from(value: $float) -> Self {
                $name(value)
            }
        }
    };
}

float_key!(
    /// `f32` usable as a map key: equality and hashing are bitwise, so `NaN`
    /// equals itself and `0.0 != -0.0`. Routes exactly like the raw `f32`.
    F32Key,
    f32
);

float_key!(
    /// `f64` usable as a map key: equality and hashing are bitwise, so `NaN`
    /// equals itself and `0.0 != -0.0`. Routes exactly like the raw `f64`.
    F64Key,
    f64
);
