//! VibeCheck query lexicon.
//!
//! Everything in this crate is pure string work that happens before a query
//! reaches the embedding models:
//!
//! - [`boost_query`] rewrites free text so that cuisine, vibe and price terms
//!   carry more weight in the sentence embedding. Matched terms are appended
//!   to the end of the query so the original wording is never altered.
//! - [`NeighborhoodResolver`] maps free text ("cheap ramen in the LES") to a
//!   canonical neighborhood label ("Lower East Side") that the result filter
//!   compares against hydrated restaurant records.
//! - [`extract_zip`] and [`NeighborhoodResolver::neighborhood_for_zip`] turn a
//!   street address into the same canonical label.
//!
//! ## Pure function guarantee
//!
//! No I/O and no global mutable state. The built-in [`Lexicon`] and resolver
//! tables are compiled in and immutable; build them once at startup and share
//! them behind an `Arc`.
//!
//! ```rust
//! use lexicon::{boost_query, Lexicon, NeighborhoodResolver};
//!
//! let lexicon = Lexicon::default();
//! let boosted = boost_query("cheap ramen in the east village", &lexicon);
//! assert_eq!(boosted, "cheap ramen in the east village ramen ramen cheap");
//!
//! let resolver = NeighborhoodResolver::default();
//! assert_eq!(resolver.resolve("cheap ramen in the east village"), Some("East Village"));
//! ```

mod boost;
mod error;
mod keywords;
mod neighborhood;
mod token;

pub use crate::boost::boost_query;
pub use crate::error::LexiconError;
pub use crate::keywords::{
    KeywordCategory, Lexicon, CUISINE_MULTIPLIER, CUISINE_TERMS, PRICE_MULTIPLIER, PRICE_TERMS,
    VIBE_MULTIPLIER, VIBE_TERMS,
};
pub use crate::neighborhood::{
    extract_zip, NeighborhoodResolver, NEIGHBORHOOD_VARIANTS, ZIP_NEIGHBORHOODS,
};
pub use crate::token::query_tokens;
