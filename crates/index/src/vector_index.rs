use ndarray::ArrayView2;
use serde::Serialize;
use tracing::{debug, info};

use crate::ann::{AnnConfig, HnswIndex};
use crate::config::{IndexBackend, IndexConfig};
use crate::{files, FlatIpIndex, IndexError};

/// One search hit: a restaurant id and its inner-product score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub entity_id: i64,
    pub score: f32,
    /// Row in the index file.
    pub row: usize,
}

/// Restaurant vectors paired with their ids.
///
/// Row `i` of the vector matrix belongs to `ids[i]`; construction refuses
/// pairs of different lengths. Immutable once built and safe to share.
#[derive(Debug)]
pub struct VectorIndex {
    flat: FlatIpIndex,
    ids: Vec<i64>,
    ann: Option<HnswIndex>,
}

impl VectorIndex {
    pub fn new(flat: FlatIpIndex, ids: Vec<i64>) -> Result<Self, IndexError> {
        if flat.len() != ids.len() {
            return Err(IndexError::CountMismatch {
                vectors: flat.len(),
                ids: ids.len(),
            });
        }
        Ok(Self {
            flat,
            ids,
            ann: None,
        })
    }

    /// Builds an index from `(entity_id, vector)` entries.
    pub fn from_entries<I>(dimension: usize, entries: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (i64, Vec<f32>)>,
    {
        let mut ids = Vec::new();
        let mut rows = Vec::new();
        for (id, vector) in entries {
            ids.push(id);
            rows.push(vector);
        }
        Self::new(FlatIpIndex::from_rows(dimension, &rows)?, ids)
    }

    /// Loads the file pair named by `cfg`, checks it against `cfg.dimension`
    /// and builds the configured backend.
    pub fn open(cfg: &IndexConfig) -> Result<Self, IndexError> {
        cfg.validate()?;
        let (flat, ids) = files::load_pair(&cfg.index_path, &cfg.ids_path, cfg.min_index_bytes)?;
        if cfg.dimension != 0 && flat.dimension() != cfg.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: cfg.dimension,
                got: flat.dimension(),
            });
        }

        let mut index = Self::new(flat, ids)?;
        if cfg.backend == IndexBackend::Hnsw {
            index = index.with_ann(cfg.ann);
        }
        info!(
            path = %cfg.index_path.display(),
            entries = index.len(),
            dimension = index.dimension(),
            backend = index.backend_name(),
            "vector index loaded"
        );
        Ok(index)
    }

    /// Adds an HNSW graph when the index is large enough for it.
    pub fn with_ann(mut self, cfg: AnnConfig) -> Self {
        self.ann = HnswIndex::build(&self.flat, cfg);
        self
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.flat.dimension()
    }

    pub fn backend_name(&self) -> &'static str {
        if self.ann.is_some() {
            "hnsw"
        } else {
            "flat"
        }
    }

    pub fn entity_id(&self, row: usize) -> Option<i64> {
        self.ids.get(row).copied()
    }

    pub fn vectors(&self) -> &FlatIpIndex {
        &self.flat
    }

    /// Up to `k` candidates by descending inner product. `k` larger than the
    /// index returns every entry.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Candidate>, IndexError> {
        if query.len() != self.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension(),
                got: query.len(),
            });
        }
        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let scored = match &self.ann {
            Some(ann) => self.rescore(ann.candidates(query, k), query, k),
            None => self.flat.search(query, k)?,
        };
        debug!(requested = k, returned = scored.len(), backend = self.backend_name(), "index search");

        Ok(scored
            .into_iter()
            .filter_map(|(row, score)| {
                self.entity_id(row).map(|entity_id| Candidate {
                    entity_id,
                    score,
                    row,
                })
            })
            .collect())
    }

    /// Row-wise [`search`](Self::search) for a `[batch, dimension]` query matrix.
    pub fn search_matrix(
        &self,
        queries: ArrayView2<'_, f32>,
        k: usize,
    ) -> Result<Vec<Vec<Candidate>>, IndexError> {
        if queries.ncols() != self.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension(),
                got: queries.ncols(),
            });
        }
        queries
            .rows()
            .into_iter()
            .map(|row| match row.as_slice() {
                Some(slice) => self.search(slice, k),
                None => self.search(&row.to_vec(), k),
            })
            .collect()
    }

    fn rescore(&self, rows: Vec<usize>, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = rows
            .into_iter()
            .filter_map(|row| self.flat.score(row, query).map(|s| (row, s)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.dedup_by_key(|(row, _)| *row);
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small() -> VectorIndex {
        VectorIndex::from_entries(
            2,
            vec![
                (501, vec![1.0, 0.0]),
                (502, vec![0.0, 1.0]),
                (503, vec![0.8, 0.6]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn rows_map_to_entity_ids() {
        let index = small();
        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].entity_id, 501);
        assert_eq!(hits[0].row, 0);
        assert_eq!(hits[1].entity_id, 503);
        assert!((hits[1].score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let flat = FlatIpIndex::from_rows(2, &[vec![1.0, 0.0]]).unwrap();
        assert!(matches!(
            VectorIndex::new(flat, vec![1, 2]),
            Err(IndexError::CountMismatch { vectors: 1, ids: 2 })
        ));
    }

    #[test]
    fn oversized_k_returns_everything() {
        let hits = small().search(&[0.5, 0.5], 100).unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        assert!(matches!(
            small().search(&[1.0, 0.0, 0.0], 1),
            Err(IndexError::DimensionMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn matrix_search_uses_each_row() {
        let index = small();
        let queries = array![[1.0f32, 0.0], [0.0, 1.0]];
        let results = index.search_matrix(queries.view(), 1).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0][0].entity_id, 501);
        assert_eq!(results[1][0].entity_id, 502);

        let wrong = array![[1.0f32, 0.0, 0.0]];
        assert!(index.search_matrix(wrong.view(), 1).is_err());
    }

    #[test]
    fn hnsw_results_are_rescored_by_inner_product() {
        let entries: Vec<(i64, Vec<f32>)> = (0..200)
            .map(|i| {
                let angle = i as f32 * 0.03;
                (i as i64 + 10, vec![angle.cos(), angle.sin(), 0.0, 0.0])
            })
            .collect();
        let exact = VectorIndex::from_entries(4, entries.clone()).unwrap();
        let approx = VectorIndex::from_entries(4, entries)
            .unwrap()
            .with_ann(AnnConfig::default().with_min_vectors_for_ann(10));
        assert_eq!(approx.backend_name(), "hnsw");

        let query = [1.0f32, 0.0, 0.0, 0.0];
        let a = approx.search(&query, 5).unwrap();
        let e = exact.search(&query, 5).unwrap();
        assert_eq!(a.len(), 5);
        assert_eq!(a[0].entity_id, e[0].entity_id);
        assert!((a[0].score - e[0].score).abs() < 1e-6);
        assert!(a.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn open_checks_expected_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = IndexConfig::new(dir.path().join("i.faiss"), dir.path().join("ids.npy"))
            .with_min_index_bytes(0)
            .with_dimension(3);
        let index = small();
        files::write_pair(&cfg.index_path, &cfg.ids_path, index.vectors(), &[501, 502, 503]).unwrap();

        assert!(matches!(
            VectorIndex::open(&cfg),
            Err(IndexError::DimensionMismatch { expected: 3, got: 2 })
        ));
        let opened = VectorIndex::open(&cfg.clone().with_dimension(2)).unwrap();
        assert_eq!(opened.len(), 3);
        assert_eq!(opened.entity_id(2), Some(503));
    }
}
