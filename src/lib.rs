//! Workspace umbrella crate for VibeCheck restaurant search.
//!
//! This crate ties the stage crates together so callers can go from one YAML
//! file to a ready [`Searcher`]:
//!
//! - `lexicon`: keyword boosting and neighborhood resolution
//! - `semantic`: text and image encoders fused into one query vector
//! - `index`: the FAISS/NumPy vector index file pair and similarity search
//! - `store`: restaurant record hydration
//! - `matcher`: over-fetch, filtering and result assembly
//!
//! ```no_run
//! # async fn run() -> Result<(), vibecheck::PipelineError> {
//! use vibecheck::{build_searcher, SearchRequest, VibeCheckConfig};
//!
//! let cfg = VibeCheckConfig::from_file("vibecheck.yaml")?;
//! let searcher = build_searcher(&cfg).await?;
//! let outcome = searcher.search(&SearchRequest::text("cheap ramen in the east village", 5))?;
//! for hit in outcome.hits {
//!     println!("{} {:.3}", hit.restaurant.name, hit.similarity_score);
//! }
//! # Ok(())
//! # }
//! ```

mod config;

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

pub use crate::config::{ConfigLoadError, VibeCheckConfig};
pub use index::{Candidate, IndexBackend, IndexConfig, IndexError, VectorIndex};
pub use lexicon::{boost_query, Lexicon, NeighborhoodResolver};
pub use matcher::{
    set_search_metrics, MatchError, PriceFilter, SearchConfig, SearchHit, SearchMetrics,
    SearchOutcome, SearchRequest, Searcher,
};
pub use semantic::{MultiModalEncoder, QueryVector, SemanticConfig, SemanticError};
pub use store::{
    InMemoryStore, Restaurant, RestaurantStore, SqliteStore, StoreConfig, StoreError,
};

/// Errors raised while assembling the search pipeline at startup.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigLoadError),
    #[error("encoder: {0}")]
    Semantic(#[from] SemanticError),
    #[error("vector index: {0}")]
    Index(#[from] IndexError),
    #[error("restaurant store: {0}")]
    Store(#[from] StoreError),
    #[error("search: {0}")]
    Match(#[from] MatchError),
}

/// Loads the encoders, the vector index and the restaurant store named by
/// `cfg` and wires them into a [`Searcher`].
///
/// Fails when any asset is missing or the encoder width differs from the
/// index; a process should not serve in that state.
pub async fn build_searcher(cfg: &VibeCheckConfig) -> Result<Searcher, PipelineError> {
    cfg.validate()?;

    let encoder = MultiModalEncoder::from_config(&cfg.semantic).await?;
    let index_cfg = cfg.index.clone().with_dimension(encoder.dimension());
    let index = VectorIndex::open(&index_cfg).inspect_err(|err| {
        error!(
            error = %err,
            index = %index_cfg.index_path.display(),
            ids = %index_cfg.ids_path.display(),
            "vector index failed to load"
        )
    })?;
    let store = store::open_store(&cfg.store)?;

    let searcher = Searcher::new(encoder, Arc::new(index), store)?.with_config(cfg.search)?;
    info!(
        entries = searcher.index().len(),
        dimension = searcher.index().dimension(),
        backend = searcher.index().backend_name(),
        image_search = searcher.encoder().image_enabled(),
        "search pipeline ready"
    );
    Ok(searcher)
}
