//! Graph index parameters.
//!
//! This module contains configuration types for tuning index construction
//! and search quality.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Graph index parameters for tuning performance and recall.
///
/// Use [`DiskAnnParams::auto`] for dimension-based defaults, or build custom
/// parameters for specific workloads. `max_degree` is fixed at index
/// creation (it pins the adjacency row width on disk); the two `ef` bounds
/// may vary freely between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskAnnParams {
    /// Out-neighbors per node; bounds the adjacency row width.
    /// Higher = better recall, more disk per node, slower insert.
    pub max_degree: usize,
    /// Traversal frontier/result bound at query time.
    /// Higher = better recall, slower search.
    pub ef_search: usize,
    /// Traversal bound during insertion.
    /// Higher = better graph quality, slower indexing.
    pub ef_construction: usize,
}

impl Default for DiskAnnParams {
    fn default() -> Self {
        Self {
            max_degree: 32,
            ef_search: 128,
            ef_construction: 200,
        }
    }
}

impl DiskAnnParams {
    /// Creates parameters tuned for the vector dimension.
    ///
    /// High-dimensional spaces need a larger fan-out to stay navigable.
    #[must_use]
    pub fn auto(dim: usize) -> Self {
        match dim {
            0..=256 => Self::default(),
            _ => Self {
                max_degree: 48,
                ef_search: 160,
                ef_construction: 300,
            },
        }
    }

    /// Creates custom parameters.
    #[must_use]
    pub const fn custom(max_degree: usize, ef_search: usize, ef_construction: usize) -> Self {
        Self {
            max_degree,
            ef_search,
            ef_construction,
        }
    }

    /// Validates the parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for zero bounds or a fan-out that
    /// cannot be addressed by signed 32-bit adjacency cells.
    pub fn validate(&self) -> Result<()> {
        if self.max_degree == 0 {
            return Err(Error::InvalidArgument("max_degree must be positive".into()));
        }
        if i32::try_from(self.max_degree).is_err() {
            return Err(Error::InvalidArgument(format!(
                "max_degree {} exceeds the adjacency cell range",
                self.max_degree
            )));
        }
        if self.ef_search == 0 {
            return Err(Error::InvalidArgument("ef_search must be positive".into()));
        }
        if self.ef_construction == 0 {
            return Err(Error::InvalidArgument(
                "ef_construction must be positive".into(),
            ));
        }
        Ok(())
    }
}
