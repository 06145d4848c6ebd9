use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ndarray::ArrayView2;
use rayon::prelude::*;

use crate::IndexError;

/// Rows at or above this count are scanned with rayon.
pub const PARALLEL_THRESHOLD: usize = 10_000;
const PARALLEL_CHUNK_ROWS: usize = 1024;

/// Dense row-major matrix searched exhaustively by inner product.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIpIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIpIndex {
    /// `data` holds `len * dimension` floats, row after row.
    pub fn new(dimension: usize, data: Vec<f32>) -> Result<Self, IndexError> {
        if dimension == 0 {
            return Err(IndexError::Format("dimension must be greater than zero".into()));
        }
        if data.len() % dimension != 0 {
            return Err(IndexError::Format(format!(
                "{} floats do not divide into rows of {dimension}",
                data.len()
            )));
        }
        Ok(Self { dimension, data })
    }

    pub fn from_rows(dimension: usize, rows: &[Vec<f32>]) -> Result<Self, IndexError> {
        let mut data = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            if row.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(dimension, data)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let start = i.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// `[len, dimension]` view of the stored vectors.
    pub fn as_matrix(&self) -> Result<ArrayView2<'_, f32>, IndexError> {
        ArrayView2::from_shape((self.len(), self.dimension), &self.data)
            .map_err(|e| IndexError::Format(e.to_string()))
    }

    /// Inner product of `query` with row `i`.
    pub fn score(&self, i: usize, query: &[f32]) -> Option<f32> {
        self.row(i).map(|row| dot(row, query))
    }

    /// Top `k` rows by inner product, best first. Equal scores keep row order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }
        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let entries = if self.len() >= PARALLEL_THRESHOLD {
            self.search_parallel(query, k)
        } else {
            self.search_sequential(query, k)
        };

        let mut results: Vec<(usize, f32)> = entries.into_iter().map(|e| (e.row, e.score)).collect();
        results.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(results)
    }

    fn search_sequential(&self, query: &[f32], k: usize) -> Vec<ScoredRow> {
        let mut heap = BinaryHeap::with_capacity(k + 1);
        for (row, values) in self.rows().enumerate() {
            push_bounded(&mut heap, ScoredRow { score: dot(values, query), row }, k);
        }
        heap.into_iter().map(|r| r.0).collect()
    }

    /// Per-chunk heaps, merged at the end.
    fn search_parallel(&self, query: &[f32], k: usize) -> Vec<ScoredRow> {
        let partial: Vec<Vec<ScoredRow>> = self
            .data
            .par_chunks(PARALLEL_CHUNK_ROWS * self.dimension)
            .enumerate()
            .map(|(chunk_idx, chunk)| {
                let base = chunk_idx * PARALLEL_CHUNK_ROWS;
                let mut local = BinaryHeap::with_capacity(k + 1);
                for (offset, values) in chunk.chunks_exact(self.dimension).enumerate() {
                    let entry = ScoredRow {
                        score: dot(values, query),
                        row: base + offset,
                    };
                    push_bounded(&mut local, entry, k);
                }
                local.into_iter().map(|r| r.0).collect()
            })
            .collect();

        let mut heap = BinaryHeap::with_capacity(k + 1);
        for entry in partial.into_iter().flatten() {
            push_bounded(&mut heap, entry, k);
        }
        heap.into_iter().map(|r| r.0).collect()
    }
}

#[inline]
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn push_bounded(heap: &mut BinaryHeap<Reverse<ScoredRow>>, entry: ScoredRow, k: usize) {
    heap.push(Reverse(entry));
    if heap.len() > k {
        heap.pop();
    }
}

/// Heap entry. Higher score ranks first; on ties the lower row ranks first.
#[derive(Debug, Clone, Copy)]
struct ScoredRow {
    score: f32,
    row: usize,
}

impl PartialEq for ScoredRow {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredRow {}

impl PartialOrd for ScoredRow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredRow {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.row.cmp(&self.row))
    }
}
