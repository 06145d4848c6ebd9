use std::collections::BTreeSet;

use index::IndexError;
use semantic::SemanticError;
use serde::{Deserialize, Serialize};
use store::{Restaurant, StoreError};
use thiserror::Error;

/// Price constraint applied to hydrated records.
///
/// Deserializes from `null`, a single level (`2`) or a list (`[1, 2]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<PriceLevels>", into = "Option<PriceLevels>")]
pub enum PriceFilter {
    #[default]
    Any,
    Exact(i64),
    OneOf(BTreeSet<i64>),
}

/// Wire form of [`PriceFilter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceLevels {
    One(i64),
    Many(Vec<i64>),
}

impl From<Option<PriceLevels>> for PriceFilter {
    fn from(levels: Option<PriceLevels>) -> Self {
        match levels {
            None => PriceFilter::Any,
            Some(PriceLevels::One(level)) => PriceFilter::Exact(level),
            Some(PriceLevels::Many(levels)) => PriceFilter::OneOf(levels.into_iter().collect()),
        }
    }
}

impl From<PriceFilter> for Option<PriceLevels> {
    fn from(filter: PriceFilter) -> Self {
        match filter {
            PriceFilter::Any => None,
            PriceFilter::Exact(level) => Some(PriceLevels::One(level)),
            PriceFilter::OneOf(levels) => Some(PriceLevels::Many(levels.into_iter().collect())),
        }
    }
}

impl PriceFilter {
    /// Parses a form value: `""` (no filter), `"2"` or `"1,2"`.
    pub fn parse(raw: &str) -> Result<Self, MatchError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(PriceFilter::Any);
        }
        let levels = raw
            .split(',')
            .map(|part| {
                part.trim().parse::<i64>().map_err(|_| {
                    MatchError::InvalidQuery(format!("invalid price_level {raw:?}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match levels.as_slice() {
            [level] if !raw.contains(',') => PriceFilter::Exact(*level),
            _ => PriceFilter::OneOf(levels.into_iter().collect()),
        })
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, PriceFilter::Any)
    }

    /// A record without a price level never satisfies an active filter.
    pub fn matches(&self, price_level: Option<i64>) -> bool {
        match (self, price_level) {
            (PriceFilter::Any, _) => true,
            (_, None) => false,
            (PriceFilter::Exact(want), Some(level)) => *want == level,
            (PriceFilter::OneOf(set), Some(level)) => set.contains(&level),
        }
    }
}

/// A single search against the restaurant index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub text: Option<String>,
    pub image: Option<Vec<u8>>,
    pub k: usize,
    pub price: PriceFilter,
}

impl SearchRequest {
    pub fn text(text: impl Into<String>, k: usize) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
            k,
            price: PriceFilter::Any,
        }
    }

    pub fn with_image(mut self, bytes: Vec<u8>) -> Self {
        self.image = Some(bytes);
        self
    }

    pub fn with_price(mut self, price: PriceFilter) -> Self {
        self.price = price;
        self
    }

    /// Query text, or `None` when absent or blank.
    pub fn query_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn image_bytes(&self) -> Option<&[u8]> {
        self.image.as_deref().filter(|b| !b.is_empty())
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.query_text().is_none() && self.image_bytes().is_none() {
            return Err(MatchError::InvalidQuery(
                "Please provide text or image query".into(),
            ));
        }
        if self.k == 0 {
            return Err(MatchError::InvalidQuery("k must be at least 1".into()));
        }
        Ok(())
    }
}

/// A hydrated restaurant with the raw inner-product score of its index row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub similarity_score: f32,
}

/// Hits plus what the pipeline derived from the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub hits: Vec<SearchHit>,
    /// Canonical neighborhood the hits were restricted to.
    pub neighborhood: Option<String>,
    /// Text actually sent to the text encoder.
    pub boosted_text: String,
    /// Candidates asked of the index after over-fetch and clamping.
    pub candidates_requested: usize,
    pub candidates_returned: usize,
}

#[derive(Debug, Error)]
pub enum MatchError {
    /// Caller input that can never succeed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("invalid search config: {0}")]
    InvalidConfig(String),
    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),
    #[error("index error: {0}")]
    Index(#[from] IndexError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
