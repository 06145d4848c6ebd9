use thiserror::Error;

/// Errors raised while building a custom [`Lexicon`](crate::Lexicon) or
/// [`NeighborhoodResolver`](crate::NeighborhoodResolver).
///
/// The built-in tables never produce these; query-time operations are total.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexiconError {
    #[error("keyword category `{0}` has no terms")]
    EmptyCategory(String),
    #[error("keyword category `{category}` has multiplier {multiplier}; must be at least 1")]
    InvalidMultiplier { category: String, multiplier: usize },
    #[error("keyword category `{0}` contains a blank term")]
    BlankTerm(String),
    #[error("duplicate keyword category `{0}`")]
    DuplicateCategory(String),
    #[error("neighborhood variant `{0}` is blank or maps to a blank name")]
    BlankVariant(String),
}
