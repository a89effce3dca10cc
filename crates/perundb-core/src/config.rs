//! `PerunDB` configuration module.
//!
//! Provides configuration file support via `perundb.toml`, environment
//! variables, and in-code defaults.
//!
//! # Priority (highest to lowest)
//!
//! 1. Environment variables (`PERUNDB_*`, nested keys split on `__`)
//! 2. Configuration file (`perundb.toml`)
//! 3. Default values

use crate::element::ElementType;
use crate::error::{Error, Result};
use crate::index::DiskAnnParams;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Index configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Out-neighbors per node.
    pub max_degree: usize,
    /// Traversal bound at query time.
    pub ef_search: usize,
    /// Traversal bound at insertion time.
    pub ef_construction: usize,
    /// Element type of stored vectors, chosen at creation.
    pub element_type: ElementType,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let params = DiskAnnParams::default();
        Self {
            max_degree: params.max_degree,
            ef_search: params.ef_search,
            ef_construction: params.ef_construction,
            element_type: ElementType::default(),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Index tuning section.
    pub index: IndexConfig,
}

impl EngineConfig {
    /// Loads configuration from defaults, `perundb.toml` in the working
    /// directory (if present), and `PERUNDB_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on parse or validation failure.
    pub fn load() -> Result<Self> {
        Self::from_figment(Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file("perundb.toml"))
            .merge(Env::prefixed("PERUNDB_").split("__")))
    }

    /// Loads configuration from an explicit file path plus the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file is absent, unparsable, or the
    /// values fail validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        Self::from_figment(Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PERUNDB_").split("__")))
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        match self.params().validate() {
            Err(Error::InvalidArgument(msg)) => Err(Error::Config(msg)),
            other => other,
        }
    }

    /// Returns the index parameters described by this configuration.
    #[must_use]
    pub fn params(&self) -> DiskAnnParams {
        DiskAnnParams {
            max_degree: self.index.max_degree,
            ef_search: self.index.ef_search,
            ef_construction: self.index.ef_construction,
        }
    }
}
