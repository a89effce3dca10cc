//! Index implementations.
//!
//! This module provides the disk-resident approximate nearest neighbor
//! index.

pub mod diskann;

pub use diskann::{DiskAnnIndex, DiskAnnParams, IndexStats};
