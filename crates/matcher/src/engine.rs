use std::sync::Arc;
use std::time::Instant;

use index::{Candidate, VectorIndex};
use lexicon::{boost_query, Lexicon, NeighborhoodResolver};
use semantic::MultiModalEncoder;
use store::RestaurantStore;
use tracing::debug;

use crate::metrics::metrics_recorder;
use crate::{MatchError, PriceFilter, SearchConfig, SearchHit, SearchOutcome, SearchRequest};


/// Runs a query through the whole pipeline: lexical boost and neighborhood
/// resolution, multi-modal encoding, similarity search with over-fetch, then
/// filtering and hydration.
///
/// Every component is shared read-only, so a `Searcher` can be cloned into
/// request handlers and called concurrently.
#[derive(Clone)]
pub struct Searcher {
    lexicon: Arc<Lexicon>,
    resolver: Arc<NeighborhoodResolver>,
    encoder: MultiModalEncoder,
    index: Arc<VectorIndex>,
    store: Arc<dyn RestaurantStore>,
    config: SearchConfig,
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("encoder", &self.encoder)
            .field("index_entries", &self.index.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Searcher {
    /// Fails when the encoder's output width differs from the index.
    pub fn new(
        encoder: MultiModalEncoder,
        index: Arc<VectorIndex>,
        store: Arc<dyn RestaurantStore>,
    ) -> Result<Self, MatchError> {
        if encoder.dimension() != index.dimension() {
            return Err(MatchError::InvalidConfig(format!(
                "encoder produces {} values ({} text + {} image) but the index holds {}-dimensional vectors",
                encoder.dimension(),
                encoder.text_dim(),
                encoder.image_dim(),
                index.dimension()
            )));
        }
        Ok(Self {
            lexicon: Arc::new(Lexicon::default()),
            resolver: Arc::new(NeighborhoodResolver::default()),
            encoder,
            index,
            store,
            config: SearchConfig::default(),
        })
    }

    pub fn with_lexicon(mut self, lexicon: Arc<Lexicon>) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<NeighborhoodResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn store(&self) -> &Arc<dyn RestaurantStore> {
        &self.store
    }

    pub fn encoder(&self) -> &MultiModalEncoder {
        &self.encoder
    }

    /// Runs `req` and returns at most `req.k` hits in descending score order.
    /// Blocks on model inference; call from a blocking context in async code.
    pub fn search(&self, req: &SearchRequest) -> Result<SearchOutcome, MatchError> {
        req.validate()?;
        let start = Instant::now();

        let text = req.query_text().unwrap_or_default();
        let neighborhood = self.resolver.resolve(text).map(str::to_string);
        let boosted_text = if text.is_empty() {
            String::new()
        } else {
            boost_query(text, &self.lexicon)
        };

        let query = self.encoder.encode(&boosted_text, req.image_bytes())?;

        let wanted = self
            .config
            .fetch_count(req.k, neighborhood.is_some(), req.price.is_active());
        let candidates_requested = wanted.min(self.index.len());
        let candidates = self
            .index
            .search_matrix(query.as_matrix(), candidates_requested)?
            .into_iter()
            .next()
            .unwrap_or_default();

        let hits = self.assemble(&candidates, neighborhood.as_deref(), &req.price, req.k)?;

        debug!(
            requested = candidates_requested,
            fetched = candidates.len(),
            surviving = hits.len(),
            neighborhood = ?neighborhood,
            has_image = query.has_image(),
            "search complete"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_search(start.elapsed(), candidates.len(), hits.len());
        }

        Ok(SearchOutcome {
            hits,
            neighborhood,
            boosted_text,
            candidates_requested,
            candidates_returned: candidates.len(),
        })
    }

    /// Single pass over score-ordered candidates: hydrate, filter, stop at `k`.
    fn assemble(
        &self,
        candidates: &[Candidate],
        neighborhood: Option<&str>,
        price: &PriceFilter,
        k: usize,
    ) -> Result<Vec<SearchHit>, MatchError> {
        let mut hits = Vec::with_capacity(k.min(candidates.len()));
        for candidate in candidates {
            if hits.len() >= k {
                break;
            }
            let Some(restaurant) = self.store.get(candidate.entity_id)? else {
                debug!(entity_id = candidate.entity_id, "candidate missing from store; skipped");
                continue;
            };
            if let Some(wanted) = neighborhood {
                if restaurant.neighborhood.as_deref() != Some(wanted) {
                    continue;
                }
            }
            if !price.matches(restaurant.price_level) {
                continue;
            }
            hits.push(SearchHit {
                restaurant,
                similarity_score: candidate.score,
            });
        }
        Ok(hits)
    }
}
