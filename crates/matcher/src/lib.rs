//! # VibeCheck Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` turns a [`SearchRequest`] (free text, an optional photo, a result
//! count and a price constraint) into a ranked list of hydrated restaurants.
//! It ties the other crates together:
//!
//! - `lexicon` boosts cuisine, vibe and price terms and resolves a
//!   neighborhood from the raw text.
//! - `semantic` fuses the boosted text and the photo into one query vector.
//! - `index` returns the nearest rows by inner product.
//! - `store` hydrates candidate ids into full records.
//!
//! ## Over-fetch
//!
//! Filters are applied after retrieval, so an active neighborhood filter (and,
//! by default, an active price filter) asks the index for
//! `k * overfetch_factor` candidates. The request is clamped to the index
//! size; a short result set is a valid outcome, not an error.
//!
//! ## Core Types
//!
//! - [`Searcher`]: the pipeline; cheap to clone, safe to share.
//! - [`SearchRequest`], [`PriceFilter`]: caller input.
//! - [`SearchHit`], [`SearchOutcome`]: results and what was derived from the query.
//! - [`SearchConfig`]: over-fetch knobs and request defaults.
//!
//! ## Observability
//!
//! Install a [`SearchMetrics`] implementation via [`set_search_metrics`] to
//! record per-search latency, candidate and hit counts.

mod config;
pub mod engine;
pub mod metrics;
mod types;

pub use crate::config::SearchConfig;
pub use crate::engine::Searcher;
pub use crate::metrics::{set_search_metrics, SearchMetrics};
pub use crate::types::{
    MatchError, PriceFilter, PriceLevels, SearchHit, SearchOutcome, SearchRequest,
};
