//! # VibeCheck Index
//!
//! Nearest-neighbour search over the precomputed restaurant vectors.
//!
//! The offline job writes two files: a FAISS `IndexFlatIP` holding one
//! 896-wide vector per restaurant and a NumPy array whose `i`-th entry is the
//! restaurant id of row `i`. [`VectorIndex::open`] loads and validates the
//! pair and answers `search(query, k)` with exact inner-product rankings.
//!
//! ## Core Features
//!
//! - **Exact search**: [`FlatIpIndex`] keeps a bounded heap per scan and
//!   switches to a rayon scan above [`PARALLEL_THRESHOLD`] rows.
//! - **File compatibility**: [`faiss`] and [`npy`] read (and write, for
//!   fixtures) the formats produced by the offline embedding job.
//! - **Optional HNSW**: `backend: hnsw` proposes candidates from a graph and
//!   re-scores them exactly, for indexes far beyond the current scale.
//!
//! ## Example Usage
//!
//! ```
//! use index::VectorIndex;
//!
//! let index = VectorIndex::from_entries(
//!     2,
//!     vec![(7, vec![1.0, 0.0]), (9, vec![0.6, 0.8])],
//! )
//! .unwrap();
//!
//! let hits = index.search(&[0.0, 1.0], 1).unwrap();
//! assert_eq!(hits[0].entity_id, 9);
//! ```

pub mod ann;
mod config;
mod error;
pub mod faiss;
pub mod files;
mod flat;
pub mod npy;
mod vector_index;

pub use ann::{AnnConfig, HnswIndex};
pub use config::{IndexBackend, IndexConfig};
pub use error::IndexError;
pub use flat::{FlatIpIndex, PARALLEL_THRESHOLD};
pub use vector_index::{Candidate, VectorIndex};
