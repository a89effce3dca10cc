//! LM-DiskANN-style graph index.
//!
//! A single-layer navigable graph whose adjacency rows and vector payloads
//! live in memory-mapped files, so working-set RAM stays small even for
//! large point sets. Supports online insertion, tombstone-based deletion
//! with slot reuse, and top-k search.
//!
//! # Module Organization
//!
//! - `params`: Index parameters (fan-out and traversal bounds)
//! - `meta`: Durable metadata snapshot
//! - `traversal`: Best-first graph expansion
//! - `index`: Main `DiskAnnIndex` implementation

mod index;
mod meta;
mod params;
mod traversal;

#[cfg(test)]
mod recall_tests;
#[cfg(test)]
mod traversal_tests;

// ============================================================================
// Public API
// ============================================================================
pub use index::{DiskAnnIndex, IndexStats};
pub use params::DiskAnnParams;
