//! Vector element types.
//!
//! The engine stores vector payloads in one of three IEEE 754 float widths,
//! chosen at index creation. The width is pinned implicitly by the sizing of
//! the on-disk vector file; reopening an index under a different element type
//! fails the size consistency check.
//!
//! # Memory footprint
//!
//! | Element | Bytes per dimension |
//! |---------|---------------------|
//! | f16     | 2                   |
//! | f32     | 4                   |
//! | f64     | 8                   |

use half::f16;
use serde::{Deserialize, Serialize};

/// Element type of a stored vector, chosen at index creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// 16-bit IEEE 754 half-precision float (2 bytes per dimension).
    F16,
    /// 32-bit IEEE 754 float (4 bytes per dimension).
    #[default]
    F32,
    /// 64-bit IEEE 754 float (8 bytes per dimension).
    F64,
}

impl ElementType {
    /// Returns the size in bytes per element.
    #[must_use]
    pub const fn bytes_per_element(&self) -> usize {
        match self {
            Self::F16 => 2,
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

mod sealed {
    use crate::storage::table::TableElement;

    pub trait Sealed: TableElement {}

    impl Sealed for half::f16 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Scalar element of a stored vector.
///
/// Implemented for [`half::f16`], `f32` and `f64`; the trait is sealed.
/// Distance kernels accumulate in the element's native width and report
/// `f32`, which is what the traversal heaps order by.
pub trait Element: Copy + Send + Sync + sealed::Sealed + 'static {
    /// The boundary-level tag for this element type.
    const KIND: ElementType;

    /// Converts an `f32` scalar into this element type.
    #[must_use]
    fn from_f32(value: f32) -> Self;

    /// Widens (or narrows) this element to `f32`.
    #[must_use]
    fn to_f32(self) -> f32;

    /// Converts an `f64` scalar into this element type.
    #[must_use]
    fn from_f64(value: f64) -> Self;

    /// Widens this element to `f64`.
    #[must_use]
    fn to_f64(self) -> f64;

    /// Squared Euclidean distance between two equal-length slices.
    #[must_use]
    fn squared_l2(a: &[Self], b: &[Self]) -> f32;

    /// Inner product of two equal-length slices.
    #[must_use]
    fn dot(a: &[Self], b: &[Self]) -> f32;

    /// Squared L2 norm of a slice.
    #[must_use]
    fn norm_sq(v: &[Self]) -> f32 {
        Self::dot(v, v)
    }
}

impl Element for f32 {
    const KIND: ElementType = ElementType::F32;

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(value: f64) -> Self {
        value as Self
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn squared_l2(a: &[Self], b: &[Self]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum()
    }

    fn dot(a: &[Self], b: &[Self]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }
}

impl Element for f64 {
    const KIND: ElementType = ElementType::F64;

    #[inline]
    fn from_f32(value: f32) -> Self {
        Self::from(value)
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[allow(clippy::cast_possible_truncation)]
    fn squared_l2(a: &[Self], b: &[Self]) -> f32 {
        // Accumulate in f64, narrow once at the end.
        let sum: f64 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        sum as f32
    }

    #[allow(clippy::cast_possible_truncation)]
    fn dot(a: &[Self], b: &[Self]) -> f32 {
        let sum: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        sum as f32
    }
}

impl Element for f16 {
    const KIND: ElementType = ElementType::F16;

    #[inline]
    fn from_f32(value: f32) -> Self {
        f16::from_f32(value)
    }

    #[inline]
    fn to_f32(self) -> f32 {
        f16::to_f32(self)
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        f16::from_f64(value)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    fn squared_l2(a: &[Self], b: &[Self]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| {
                let d = x.to_f32() - y.to_f32();
                d * d
            })
            .sum()
    }

    fn dot(a: &[Self], b: &[Self]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.to_f32() * y.to_f32())
            .sum()
    }
}

/// Converts a slice of any element type into the index element type.
///
/// Conversion goes through `f64`, so it is lossless whenever the target
/// width is at least the source width.
#[must_use]
pub(crate) fn convert_slice<S: Element, T: Element>(src: &[S]) -> Vec<T> {
    src.iter().map(|&v| T::from_f64(v.to_f64())).collect()
}

