//! Durable index metadata.
//!
//! The metadata file is a bincode snapshot of the five header fields. It is
//! rewritten after every mutation; the write goes to a sibling temp path and
//! is renamed into place, so a crash can never leave a torn snapshot.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Sentinel for "no entrypoint" in the serialized record.
const NO_ENTRYPOINT: i64 = -1;

/// Serialized index header.
///
/// `num_points` is the high-water mark of allocated slots (it never
/// decreases); `free_list` holds the tombstoned slots awaiting reuse;
/// `entrypoint` seeds every traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct IndexMeta {
    pub num_points: u64,
    pub dim: u32,
    pub max_degree: u32,
    pub free_list: Vec<u32>,
    entrypoint: i64,
}

impl IndexMeta {
    /// Creates the header of an empty index.
    pub(crate) fn new(dim: u32, max_degree: u32) -> Self {
        Self {
            num_points: 0,
            dim,
            max_degree,
            free_list: Vec::new(),
            entrypoint: NO_ENTRYPOINT,
        }
    }

    /// Returns the entrypoint, if any live node exists.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn entrypoint(&self) -> Option<u32> {
        if self.entrypoint == NO_ENTRYPOINT {
            None
        } else {
            Some(self.entrypoint as u32)
        }
    }

    /// Replaces the entrypoint.
    pub(crate) fn set_entrypoint(&mut self, entrypoint: Option<u32>) {
        self.entrypoint = entrypoint.map_or(NO_ENTRYPOINT, i64::from);
    }

    /// Loads a snapshot from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFile`] if the file is absent and
    /// [`Error::Corrupted`] if it cannot be deserialized or its fields are
    /// inconsistent.
    #[allow(clippy::cast_sign_loss)]
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|_| Error::MissingFile(path.to_path_buf()))?;
        let meta: Self = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| Error::Corrupted(format!("metadata snapshot unreadable: {e}")))?;

        if meta.dim == 0 || meta.max_degree == 0 {
            return Err(Error::Corrupted(
                "metadata has zero dimension or degree".into(),
            ));
        }
        if meta.entrypoint < NO_ENTRYPOINT
            || (meta.entrypoint >= 0 && meta.entrypoint as u64 >= meta.num_points)
        {
            return Err(Error::Corrupted(format!(
                "entrypoint {} out of range for {} points",
                meta.entrypoint, meta.num_points
            )));
        }
        if meta
            .free_list
            .iter()
            .any(|&slot| u64::from(slot) >= meta.num_points)
        {
            return Err(Error::Corrupted("free list references unallocated slots".into()));
        }

        Ok(meta)
    }

    /// Writes a snapshot to disk atomically (temp file + rename).
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written or renamed.
    pub(crate) fn store(&self, path: &Path) -> Result<()> {
        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);

        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(std::io::IntoInnerError::into_error)?
            .sync_all()?;

        std::fs::rename(&tmp, path)?;
        debug!(
            path = %path.display(),
            num_points = self.num_points,
            free = self.free_list.len(),
            "metadata snapshot committed"
        );
        Ok(())
    }
}
