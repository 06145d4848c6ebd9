use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ann::AnnConfig;
use crate::IndexError;

/// Which search structure answers queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Exhaustive inner-product scan; exact.
    #[default]
    Flat,
    /// HNSW candidates re-scored by inner product.
    Hnsw,
}

/// Location and shape of the vector index file pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// FAISS `IndexFlatIP` file.
    pub index_path: PathBuf,
    /// NumPy array mapping row number to restaurant id.
    pub ids_path: PathBuf,
    /// Smaller index files are treated as corrupt.
    pub min_index_bytes: u64,
    /// Expected vector width. `0` skips the check (the pipeline fills it
    /// from the encoder dimensions).
    pub dimension: usize,
    pub backend: IndexBackend,
    pub ann: AnnConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("vibecheck_full_output/vibecheck_index.faiss"),
            ids_path: PathBuf::from("vibecheck_full_output/meta_ids.npy"),
            min_index_bytes: 1024,
            dimension: 896,
            backend: IndexBackend::Flat,
            ann: AnnConfig::default(),
        }
    }
}

impl IndexConfig {
    pub fn new(index_path: impl Into<PathBuf>, ids_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            ids_path: ids_path.into(),
            ..Self::default()
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_min_index_bytes(mut self, min: u64) -> Self {
        self.min_index_bytes = min;
        self
    }

    pub fn with_backend(mut self, backend: IndexBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_ann(mut self, ann: AnnConfig) -> Self {
        self.ann = ann;
        self
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        if self.index_path.as_os_str().is_empty() || self.ids_path.as_os_str().is_empty() {
            return Err(IndexError::InvalidConfig(
                "index_path and ids_path must be set".into(),
            ));
        }
        if self.backend == IndexBackend::Hnsw && (self.ann.m == 0 || self.ann.ef_search == 0) {
            return Err(IndexError::InvalidConfig(
                "hnsw requires m and ef_search greater than zero".into(),
            ));
        }
        Ok(())
    }
}
