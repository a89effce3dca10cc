//! Disk-resident graph index.
//!
//! `DiskAnnIndex` couples a memory-mapped vector table and a fixed-degree
//! adjacency table under one directory prefix, plus a bincode metadata
//! snapshot and the two user-key dictionaries. Slots are dense internal IDs;
//! callers see stable 1-based external IDs that survive restarts.
//!
//! The edge relation is kept symmetric at all times: forward edges are
//! mirrored by back-patching, and when a prune evicts a neighbor the mirror
//! edge is removed as well. Deletion's reverse-edge scrub therefore covers
//! every in-edge of the deleted node, which is what keeps tombstones from
//! ever appearing in a live adjacency row.

use super::meta::IndexMeta;
use super::params::DiskAnnParams;
use crate::distance::DistanceMetric;
use crate::element::{convert_slice, Element, ElementType};
use crate::error::{Error, Result};
use crate::keystore::{DirKeyStore, KeyStore};
use crate::storage::adjacency::{decode_row, encode_row};
use crate::storage::table::TableFile;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const VEC_SUFFIX: &str = ".vec";
const ADJ_SUFFIX: &str = ".adj";
const META_SUFFIX: &str = ".meta";
const FORWARD_DB_SUFFIX: &str = "forward_db.leveldb";
const REVERSE_DB_SUFFIX: &str = "reverse_db.leveldb";

/// Appends a suffix to a path prefix (no separator).
fn prefixed(prefix: &Path, suffix: &str) -> PathBuf {
    let mut os: OsString = prefix.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

/// Observability snapshot of the index state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// High-water mark of allocated slots (never decreases).
    pub num_points: u64,
    /// Currently live points.
    pub live_points: u64,
    /// Tombstoned slots awaiting reuse.
    pub free_slots: usize,
    /// External ID of the traversal entrypoint, if any.
    pub entrypoint: Option<u64>,
}

/// Disk-resident approximate nearest neighbor index.
///
/// The index is single-threaded: mutations take `&mut self`, queries take
/// `&self`, and there is no internal synchronization. At most one writer may
/// own an index directory at a time.
pub struct DiskAnnIndex<T: Element> {
    prefix: PathBuf,
    params: DiskAnnParams,
    metric: DistanceMetric,
    meta: IndexMeta,
    vectors: TableFile<T>,
    adjacency: TableFile<i32>,
    /// Mirror of `meta.free_list` for O(1) liveness checks.
    tombstones: FxHashSet<u32>,
    /// key -> external ID.
    forward: DirKeyStore,
    /// external ID -> key.
    reverse: DirKeyStore,
}

impl<T: Element> DiskAnnIndex<T> {
    /// Creates a new, empty index under the given path prefix.
    ///
    /// The element type is pinned at creation through `T` (it sizes the
    /// vector file); `dim` and `params.max_degree` are persisted in the
    /// metadata snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid parameters or if any of the backing
    /// files cannot be created.
    pub fn create<P: AsRef<Path>>(
        prefix: P,
        dim: usize,
        params: DiskAnnParams,
        metric: DistanceMetric,
    ) -> Result<Self> {
        params.validate()?;
        if dim == 0 {
            return Err(Error::InvalidArgument("dim must be positive".into()));
        }
        let dim_u32 = u32::try_from(dim)
            .map_err(|_| Error::InvalidArgument(format!("dim {dim} out of range")))?;
        let degree_u32 = u32::try_from(params.max_degree)
            .map_err(|_| Error::InvalidArgument("max_degree out of range".into()))?;

        let prefix = prefix.as_ref().to_path_buf();
        if let Some(parent) = prefix.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let vectors = TableFile::create(prefixed(&prefix, VEC_SUFFIX), dim)?;
        let adjacency = TableFile::create(prefixed(&prefix, ADJ_SUFFIX), params.max_degree)?;

        let meta = IndexMeta::new(dim_u32, degree_u32);
        meta.store(&prefixed(&prefix, META_SUFFIX))?;

        let forward = DirKeyStore::create(prefixed(&prefix, FORWARD_DB_SUFFIX))?;
        let reverse = DirKeyStore::create(prefixed(&prefix, REVERSE_DB_SUFFIX))?;

        info!(prefix = %prefix.display(), dim, max_degree = params.max_degree, "index created");

        Ok(Self {
            prefix,
            params,
            metric,
            meta,
            vectors,
            adjacency,
            tombstones: FxHashSet::default(),
            forward,
            reverse,
        })
    }

    /// Opens an existing index.
    ///
    /// `dim` and `max_degree` are read back from the metadata snapshot;
    /// `params.max_degree` must match the persisted value (there is no
    /// schema migration). The metric must be the one the index was built
    /// with; it is not persisted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFile`] if any of the five backing paths is
    /// absent, [`Error::InvalidArgument`] on a degree mismatch, and
    /// [`Error::Corrupted`] if the metadata disagrees with the mapped file
    /// sizes.
    pub fn open<P: AsRef<Path>>(
        prefix: P,
        params: DiskAnnParams,
        metric: DistanceMetric,
    ) -> Result<Self> {
        params.validate()?;
        let prefix = prefix.as_ref().to_path_buf();

        let vec_path = prefixed(&prefix, VEC_SUFFIX);
        let adj_path = prefixed(&prefix, ADJ_SUFFIX);
        let meta_path = prefixed(&prefix, META_SUFFIX);
        for path in [&vec_path, &adj_path, &meta_path] {
            if !path.is_file() {
                return Err(Error::MissingFile(path.clone()));
            }
        }

        let meta = IndexMeta::load(&meta_path)?;
        if meta.max_degree as usize != params.max_degree {
            return Err(Error::InvalidArgument(format!(
                "index was built with max_degree {}, not {}",
                meta.max_degree, params.max_degree
            )));
        }

        let dim = meta.dim as usize;
        let vectors: TableFile<T> = TableFile::open(&vec_path, dim).map_err(map_open_err)?;
        let adjacency: TableFile<i32> =
            TableFile::open(&adj_path, params.max_degree).map_err(map_open_err)?;

        if vectors.capacity() != adjacency.capacity() {
            return Err(Error::Corrupted(format!(
                "vector and adjacency capacities disagree ({} vs {}); wrong element type?",
                vectors.capacity(),
                adjacency.capacity()
            )));
        }
        if meta.num_points > vectors.capacity() as u64 {
            return Err(Error::Corrupted(format!(
                "metadata records {} points but the tables hold only {}",
                meta.num_points,
                vectors.capacity()
            )));
        }

        let forward = DirKeyStore::open(prefixed(&prefix, FORWARD_DB_SUFFIX))?;
        let reverse = DirKeyStore::open(prefixed(&prefix, REVERSE_DB_SUFFIX))?;

        let tombstones: FxHashSet<u32> = meta.free_list.iter().copied().collect();

        info!(
            prefix = %prefix.display(),
            num_points = meta.num_points,
            live = meta.num_points - tombstones.len() as u64,
            "index opened"
        );

        Ok(Self {
            prefix,
            params,
            metric,
            meta,
            vectors,
            adjacency,
            tombstones,
            forward,
            reverse,
        })
    }

    /// Returns the vector dimension.
    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.vectors.row_width()
    }

    /// Returns the distance metric used by this index.
    #[inline]
    #[must_use]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Returns the element type the vector payloads are stored in.
    #[inline]
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        T::KIND
    }

    /// Returns the parameter set.
    #[inline]
    #[must_use]
    pub fn params(&self) -> DiskAnnParams {
        self.params
    }

    /// Returns the number of live points.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> usize {
        (self.meta.num_points as usize) - self.meta.free_list.len()
    }

    /// Returns true if no live point exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an observability snapshot.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_points: self.meta.num_points,
            live_points: self.len() as u64,
            free_slots: self.meta.free_list.len(),
            entrypoint: self.meta.entrypoint().map(|slot| u64::from(slot) + 1),
        }
    }

    /// Inserts a vector, returning `(effective_key, external_id)`.
    ///
    /// The input may be any element width; it is converted to the index
    /// element type before storage. When no key is supplied, the stringified
    /// external ID is registered instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] for a wrong-length vector, and
    /// propagates IO failures (which leave the last metadata snapshot
    /// uncommitted).
    pub fn insert<S: Element>(&mut self, vector: &[S], key: Option<&str>) -> Result<(String, u64)> {
        if vector.len() != self.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: vector.len(),
            });
        }
        let stored: Vec<T> = convert_slice(vector);

        // Allocate a slot: reuse a tombstone or extend the tail.
        let slot = if let Some(slot) = self.meta.free_list.pop() {
            self.tombstones.remove(&slot);
            slot
        } else {
            let slot = u32::try_from(self.meta.num_points)
                .map_err(|_| Error::InvalidArgument("internal ID space exhausted".into()))?;
            if i32::try_from(slot).is_err() {
                return Err(Error::InvalidArgument("internal ID space exhausted".into()));
            }
            self.meta.num_points += 1;
            slot
        };

        self.vectors.ensure_slot(slot as usize)?;
        self.adjacency.ensure_slot(slot as usize)?;
        self.vectors.write_column(slot as usize, &stored);

        let external = u64::from(slot) + 1;
        let effective_key = key.map_or_else(|| external.to_string(), str::to_string);

        if self.entrypoint().is_none() {
            // Bootstrap: the first live node seeds every future traversal.
            let empty = encode_row(&[], self.params.max_degree);
            self.adjacency.write_column(slot as usize, &empty);
            self.meta.set_entrypoint(Some(slot));
            self.commit_meta()?;
            self.register_key(&effective_key, external)?;
            return Ok((effective_key, external));
        }

        // Candidate discovery around the new vector.
        let ef = self.params.max_degree.max(self.params.ef_construction);
        let mut candidates = self.traverse(&stored, ef);
        candidates.retain(|&(_, id)| id != slot);
        candidates.truncate(self.params.max_degree);

        // Forward edges, already in ascending distance order.
        let neighbor_ids: Vec<u32> = candidates.iter().map(|&(_, id)| id).collect();
        let row = encode_row(&neighbor_ids, self.params.max_degree);
        self.adjacency.write_column(slot as usize, &row);

        // Back-patch each chosen neighbor; evicted edges are mirrored out so
        // the relation stays symmetric (best-effort across candidates, one
        // metadata commit for the whole insert).
        for &(_, candidate) in &candidates {
            let mut patched = self.neighbors(candidate);
            if patched.contains(&slot) {
                continue;
            }
            patched.push(slot);
            let pruned = self.prune_neighbors(candidate, &patched);
            for &dropped in patched.iter().filter(|&&id| !pruned.contains(&id)) {
                self.remove_edge(dropped, candidate);
            }
            let row = encode_row(&pruned, self.params.max_degree);
            self.adjacency.write_column(candidate as usize, &row);
        }

        self.commit_meta()?;
        self.register_key(&effective_key, external)?;
        Ok((effective_key, external))
    }

    /// Deletes a point by external ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointNotFound`] for an out-of-range or already
    /// deleted ID.
    pub fn delete_by_id(&mut self, id: u64) -> Result<()> {
        let slot = self.resolve_live_slot(id)?;

        // Reverse-edge scrub. Symmetry makes the out-neighbors exactly the
        // in-neighbors.
        for neighbor in self.neighbors(slot) {
            self.remove_edge(neighbor, slot);
        }

        // Clear the row, then repair the entrypoint if it dies with this
        // node.
        let empty = encode_row(&[], self.params.max_degree);
        self.adjacency.write_column(slot as usize, &empty);

        if self.meta.entrypoint() == Some(slot) {
            let repaired = self.first_live_slot_excluding(slot);
            self.meta.set_entrypoint(repaired);
        }

        self.meta.free_list.push(slot);
        self.tombstones.insert(slot);
        self.vectors.zero_column(slot as usize);

        self.commit_meta()?;

        let external = id.to_string();
        if let Some(key) = self.reverse.get(&external).map(str::to_string) {
            self.forward.delete(&key)?;
        }
        self.reverse.delete(&external)?;
        Ok(())
    }

    /// Deletes a point by user key.
    ///
    /// Returns `Ok(false)` without mutation if the key is unknown.
    ///
    /// # Errors
    ///
    /// Propagates IO failures from the underlying delete.
    pub fn delete_by_key(&mut self, key: &str) -> Result<bool> {
        let Some(id) = self.forward.get(key) else {
            return Ok(false);
        };
        let id: u64 = id
            .parse()
            .map_err(|_| Error::Corrupted(format!("forward dictionary maps '{key}' to a non-numeric ID")))?;
        self.delete_by_id(id)?;
        Ok(true)
    }

    /// Searches for the `topk` nearest neighbors of the query.
    ///
    /// Returns `(optional_key, external_id)` pairs in ascending distance
    /// order. An empty index yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for `topk == 0` and
    /// [`Error::DimensionMismatch`] for a wrong-length query.
    pub fn search<S: Element>(
        &self,
        query: &[S],
        topk: usize,
    ) -> Result<Vec<(Option<String>, u64)>> {
        if topk == 0 {
            return Err(Error::InvalidArgument("topk must be positive".into()));
        }
        if query.len() != self.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: query.len(),
            });
        }

        let converted: Vec<T> = convert_slice(query);
        let ef = topk.max(self.params.ef_search);
        let mut hits = self.traverse(&converted, ef);

        // Re-rank by exact distance to the converted query.
        for hit in &mut hits {
            hit.0 = self.metric.distance(&converted, self.vector(hit.1));
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        hits.truncate(topk);

        Ok(hits
            .into_iter()
            .map(|(_, slot)| self.externalize(slot))
            .collect())
    }

    /// Exhaustive exact top-k over all live points.
    ///
    /// O(n) per query; useful as ground truth and for small point sets.
    ///
    /// # Errors
    ///
    /// Same argument errors as [`Self::search`].
    pub fn exact_search<S: Element>(
        &self,
        query: &[S],
        topk: usize,
    ) -> Result<Vec<(Option<String>, u64)>> {
        if topk == 0 {
            return Err(Error::InvalidArgument("topk must be positive".into()));
        }
        if query.len() != self.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: query.len(),
            });
        }

        let converted: Vec<T> = convert_slice(query);
        let mut hits: Vec<(f32, u32)> = self
            .live_slots()
            .map(|slot| {
                (
                    self.metric.distance(&converted, self.vector(slot)),
                    slot,
                )
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        hits.truncate(topk);

        Ok(hits
            .into_iter()
            .map(|(_, slot)| self.externalize(slot))
            .collect())
    }

    /// Retrieves the stored vector for an external ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointNotFound`] for an out-of-range or tombstoned
    /// ID.
    pub fn get_vector_by_id(&self, id: u64) -> Result<Vec<T>> {
        let slot = self.resolve_live_slot(id)?;
        Ok(self.vector(slot).to_vec())
    }

    /// Retrieves the stored vector for a user key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] for an unknown key.
    pub fn get_vector_by_key(&self, key: &str) -> Result<Vec<T>> {
        let Some(id) = self.forward.get(key) else {
            return Err(Error::KeyNotFound(key.to_string()));
        };
        let id: u64 = id
            .parse()
            .map_err(|_| Error::Corrupted(format!("forward dictionary maps '{key}' to a non-numeric ID")))?;
        self.get_vector_by_id(id)
    }

    /// Flushes all backing files and consumes the handle.
    ///
    /// # Errors
    ///
    /// Returns the first flush failure encountered.
    pub fn close(mut self) -> Result<()> {
        self.flush_all()?;
        info!(prefix = %self.prefix.display(), "index closed");
        Ok(())
    }

    // =========================================================================
    // Crate-internal accessors (shared with the traversal)
    // =========================================================================

    #[inline]
    pub(crate) fn entrypoint(&self) -> Option<u32> {
        self.meta.entrypoint()
    }

    #[inline]
    pub(crate) fn vector(&self, slot: u32) -> &[T] {
        self.vectors.column(slot as usize)
    }

    #[inline]
    pub(crate) fn neighbors(&self, slot: u32) -> Vec<u32> {
        decode_row(self.adjacency.column(slot as usize))
    }

    #[inline]
    pub(crate) fn is_tombstoned(&self, slot: u32) -> bool {
        self.tombstones.contains(&slot)
    }

    /// Iterates over all live slots in ascending order.
    pub(crate) fn live_slots(&self) -> impl Iterator<Item = u32> + '_ {
        #[allow(clippy::cast_possible_truncation)]
        let high = self.meta.num_points as u32;
        (0..high).filter(move |slot| !self.tombstones.contains(slot))
    }

    // =========================================================================
    // Private helpers
    // =========================================================================

    fn resolve_live_slot(&self, external: u64) -> Result<u32> {
        if external == 0 || external > self.meta.num_points {
            return Err(Error::PointNotFound(external));
        }
        #[allow(clippy::cast_possible_truncation)]
        let slot = (external - 1) as u32;
        if self.tombstones.contains(&slot) {
            return Err(Error::PointNotFound(external));
        }
        Ok(slot)
    }

    fn externalize(&self, slot: u32) -> (Option<String>, u64) {
        let external = u64::from(slot) + 1;
        let key = self.reverse.get(&external.to_string()).map(str::to_string);
        (key, external)
    }

    fn first_live_slot_excluding(&self, excluded: u32) -> Option<u32> {
        self.live_slots().find(|&slot| slot != excluded)
    }

    /// Sorts candidate neighbors by ascending distance to the owner (ties by
    /// ascending ID) and keeps at most `max_degree`.
    fn prune_neighbors(&self, owner: u32, candidates: &[u32]) -> Vec<u32> {
        let owner_vec = self.vector(owner).to_vec();
        let mut with_dist: Vec<(f32, u32)> = candidates
            .iter()
            .map(|&id| (self.metric.distance(&owner_vec, self.vector(id)), id))
            .collect();
        with_dist.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        with_dist.truncate(self.params.max_degree);
        with_dist.into_iter().map(|(_, id)| id).collect()
    }

    /// Removes the directed edge `from -> to`, if present.
    fn remove_edge(&mut self, from: u32, to: u32) {
        let row = self.neighbors(from);
        if !row.contains(&to) {
            return;
        }
        let filtered: Vec<u32> = row.into_iter().filter(|&id| id != to).collect();
        let encoded = encode_row(&filtered, self.params.max_degree);
        self.adjacency.write_column(from as usize, &encoded);
    }

    fn register_key(&mut self, key: &str, external: u64) -> Result<()> {
        let external = external.to_string();
        self.forward.put(key, &external)?;
        self.reverse.put(&external, key)?;
        Ok(())
    }

    fn commit_meta(&mut self) -> Result<()> {
        self.meta.store(&prefixed(&self.prefix, META_SUFFIX))
    }

    fn flush_all(&mut self) -> Result<()> {
        self.vectors.flush()?;
        self.adjacency.flush()?;
        self.forward.flush()?;
        self.reverse.flush()?;
        Ok(())
    }
}

fn map_open_err(err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::InvalidData {
        Error::Corrupted(err.to_string())
    } else {
        Error::Io(err)
    }
}

impl<T: Element> Drop for DiskAnnIndex<T> {
    fn drop(&mut self) {
        if let Err(e) = self.flush_all() {
            error!(prefix = %self.prefix.display(), ?e, "failed to flush index on drop");
        }
    }
}
