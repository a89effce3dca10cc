//! # `PerunDB` Core
//!
//! Disk-resident approximate nearest neighbor index engine written in Rust.
//!
//! `PerunDB` keeps a navigable graph over high-dimensional vectors in
//! memory-mapped files, so the working set stays small even when the point
//! set is very large. It supports online insertion, online deletion, and
//! top-k similarity queries, with stable numeric identifiers that survive
//! process restarts.
//!
//! ## Features
//!
//! - **Small RAM footprint**: adjacency rows and vector payloads live on
//!   disk behind `mmap`, not in the heap
//! - **Dynamic**: insert and delete online; deleted slots are reused
//! - **Stable IDs**: 1-based external IDs remain valid across reopen, with
//!   an optional user-key dictionary in both directions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use perundb_core::{DiskAnnIndex, DiskAnnParams, DistanceMetric};
//!
//! // Create an index for 128-dimensional f32 vectors
//! let mut index: DiskAnnIndex<f32> =
//!     DiskAnnIndex::create("./data/docs", 128, DiskAnnParams::default(), DistanceMetric::Euclidean)?;
//!
//! // Insert vectors (optionally under a user key)
//! let (key, id) = index.insert(&embedding, Some("doc-1"))?;
//!
//! // Search for the 10 nearest neighbors
//! let results = index.search(&query, 10)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod distance;
pub mod element;
pub mod error;
pub mod index;
pub mod keystore;
pub(crate) mod storage;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod element_tests;
#[cfg(test)]
mod error_tests;

pub use config::EngineConfig;
pub use distance::DistanceMetric;
pub use element::{Element, ElementType};
pub use error::{Error, Result};
pub use index::{DiskAnnIndex, DiskAnnParams, IndexStats};
pub use keystore::{DirKeyStore, KeyStore};
