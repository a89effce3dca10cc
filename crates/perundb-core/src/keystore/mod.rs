//! User-key dictionaries.
//!
//! The index keeps an optional mapping between opaque string keys and
//! external IDs, in both directions. The engine treats the two dictionaries
//! as an injected collaborator behind the [`KeyStore`] interface and always
//! updates both on insert and delete; [`DirKeyStore`] is the shipped
//! implementation, holding a bincode snapshot file inside its directory.
//!
//! The directory names under the index prefix (`*forward_db.leveldb`,
//! `*reverse_db.leveldb`) are part of the pinned on-disk layout.

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A persistent string-to-string dictionary.
///
/// Operations are synchronous and committed before they return.
pub trait KeyStore {
    /// Inserts or replaces a mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the mapping cannot be persisted.
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Looks up a key.
    fn get(&self, key: &str) -> Option<&str>;

    /// Removes a mapping. Returns whether the key was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn delete(&mut self, key: &str) -> Result<bool>;

    /// Iterates over all entries in unspecified order.
    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_>;

    /// Forces any buffered state to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&mut self) -> Result<()>;
}

/// Directory-backed [`KeyStore`] holding one bincode snapshot file.
///
/// Every mutation rewrites the snapshot through a sibling temp file and a
/// rename, so a crash never leaves a torn dictionary behind.
pub struct DirKeyStore {
    dir: PathBuf,
    map: FxHashMap<String, String>,
}

impl DirKeyStore {
    const SNAPSHOT: &'static str = "keys.bin";

    /// Creates a new, empty store, replacing any existing snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the initial
    /// snapshot cannot be written.
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let mut store = Self {
            dir,
            map: FxHashMap::default(),
        };
        store.commit()?;
        Ok(store)
    }

    /// Opens an existing store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFile`] if the directory is absent and
    /// [`Error::Corrupted`] if the snapshot cannot be deserialized.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(Error::MissingFile(dir));
        }

        let snapshot = dir.join(Self::SNAPSHOT);
        let file = File::open(&snapshot).map_err(|_| Error::MissingFile(snapshot.clone()))?;
        let map: FxHashMap<String, String> = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| Error::Corrupted(format!("key store snapshot unreadable: {e}")))?;

        Ok(Self { dir, map })
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn commit(&mut self) -> Result<()> {
        let snapshot = self.dir.join(Self::SNAPSHOT);
        let tmp = self.dir.join(format!("{}.tmp", Self::SNAPSHOT));

        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &self.map)?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(std::io::IntoInnerError::into_error)?
            .sync_all()?;

        std::fs::rename(&tmp, &snapshot)?;
        Ok(())
    }
}

impl KeyStore for DirKeyStore {
    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.map.insert(key.to_string(), value.to_string());
        self.commit()
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        let removed = self.map.remove(key).is_some();
        if removed {
            self.commit()?;
        }
        Ok(removed)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        Box::new(
            self.map
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    fn flush(&mut self) -> Result<()> {
        self.commit()
    }
}

#[cfg(test)]
mod keystore_tests;
