//! Approximate candidate generation using HNSW.
//!
//! The graph is built with cosine distance and only proposes rows; the final
//! ranking always re-scores candidates by exact inner product, so reported
//! scores match the flat index.
//!
//! ## When to Use
//!
//! - Tens of thousands of restaurants or more
//! - Acceptable to miss a few true nearest neighbors
//!
//! Below `min_vectors_for_ann` rows the flat scan is used even when HNSW is configured.

use hnsw_rs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::FlatIpIndex;

/// Configuration for ANN index construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnConfig {
    /// Number of neighbors per node (higher = better recall, slower build).
    /// Default: 16
    pub m: usize,
    /// Size of dynamic candidate list during construction.
    /// Default: 200
    pub ef_construction: usize,
    /// Size of dynamic candidate list during search; also the minimum number
    /// of candidates re-scored per query.
    /// Default: 64
    pub ef_search: usize,
    /// Minimum number of vectors before the graph is built.
    /// Default: 1000
    pub min_vectors_for_ann: usize,
}

impl Default for AnnConfig {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 64,
            min_vectors_for_ann: 1000,
        }
    }
}

impl AnnConfig {
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    pub fn with_ef_construction(mut self, ef: usize) -> Self {
        self.ef_construction = ef;
        self
    }

    pub fn with_ef_search(mut self, ef: usize) -> Self {
        self.ef_search = ef;
        self
    }

    pub fn with_min_vectors_for_ann(mut self, min: usize) -> Self {
        self.min_vectors_for_ann = min;
        self
    }

    /// Check if ANN should be used given the current dataset size.
    pub fn should_use_ann(&self, num_vectors: usize) -> bool {
        num_vectors >= self.min_vectors_for_ann.max(2)
    }
}

/// HNSW graph over the rows of a [`FlatIpIndex`].
pub struct HnswIndex {
    config: AnnConfig,
    hnsw: Hnsw<'static, f32, DistCosine>,
}

impl HnswIndex {
    /// Build the graph; `None` when the index is too small for it to pay off.
    pub fn build(flat: &FlatIpIndex, config: AnnConfig) -> Option<Self> {
        let nb_elem = flat.len();
        if !config.should_use_ann(nb_elem) {
            return None;
        }

        let nb_layer = 16.min(((nb_elem as f32).ln().trunc() as usize).max(1));
        let hnsw = Hnsw::<f32, DistCosine>::new(
            config.m,
            nb_elem,
            nb_layer,
            config.ef_construction,
            DistCosine {},
        );

        let rows: Vec<Vec<f32>> = flat.rows().map(<[f32]>::to_vec).collect();
        let data_for_insertion: Vec<(&Vec<f32>, usize)> =
            rows.iter().enumerate().map(|(idx, vec)| (vec, idx)).collect();
        hnsw.parallel_insert(&data_for_insertion);

        Some(Self { config, hnsw })
    }

    /// Row numbers of at least `k` (up to `ef_search`) likely neighbors, unordered.
    pub fn candidates(&self, query: &[f32], k: usize) -> Vec<usize> {
        let wanted = k.max(self.config.ef_search);
        let ef = self.config.ef_search.max(wanted);
        self.hnsw
            .search(query, wanted, ef)
            .into_iter()
            .map(|neighbour| neighbour.get_origin_id())
            .collect()
    }

    pub fn config(&self) -> &AnnConfig {
        &self.config
    }
}

impl std::fmt::Debug for HnswIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HnswIndex").field("config", &self.config).finish()
    }
}
