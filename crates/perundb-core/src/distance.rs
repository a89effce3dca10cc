//! Distance metrics for vector similarity calculations.

use crate::element::Element;
use serde::{Deserialize, Serialize};

/// Distance metric for vector similarity calculations.
///
/// Every metric is symmetric with `d(x, x) = 0`, so distances order naturally
/// ascending (lower is more similar). The metric is supplied at create/open
/// time and is not persisted; it must be consistent across the lifetime of an
/// index directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Euclidean distance (L2 norm).
    /// Best for spatial data and when magnitude matters.
    #[default]
    Euclidean,

    /// Cosine distance (1 - cosine similarity).
    /// Best for normalized vectors, commonly used with text embeddings.
    Cosine,
}

impl DistanceMetric {
    /// Calculates the distance between two vectors using the specified metric.
    ///
    /// # Panics
    ///
    /// Panics if vectors have different dimensions.
    #[must_use]
    pub fn distance<T: Element>(&self, a: &[T], b: &[T]) -> f32 {
        assert_eq!(a.len(), b.len(), "Vector dimensions must match");

        match self {
            Self::Euclidean => T::squared_l2(a, b).sqrt(),
            Self::Cosine => Self::cosine_distance(a, b),
        }
    }

    /// Calculates cosine distance between two vectors.
    ///
    /// A zero vector has no direction; its distance to anything is defined
    /// as 1 (orthogonal) so the result stays in [0, 2].
    fn cosine_distance<T: Element>(a: &[T], b: &[T]) -> f32 {
        let norm_a = T::norm_sq(a).sqrt();
        let norm_b = T::norm_sq(b).sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 1.0;
        }

        1.0 - T::dot(a, b) / (norm_a * norm_b)
    }
}
