//! Built-in keyword categories and the [`Lexicon`] that groups them.
//!
//! Each category carries a multiplier: the total number of times a matched
//! term should appear in the boosted query. Cuisine terms dominate the
//! sentence embedding (×3); vibe and price terms get a moderate push (×2).

use fxhash::FxHashSet;

use crate::error::LexiconError;
use crate::token::query_tokens;

pub const CUISINE_MULTIPLIER: usize = 3;
pub const VIBE_MULTIPLIER: usize = 2;
pub const PRICE_MULTIPLIER: usize = 2;

/// Cuisines, dishes and dietary styles.
pub const CUISINE_TERMS: &[&str] = &[
    // asian
    "chinese", "japanese", "korean", "thai", "vietnamese", "indian",
    "filipino", "indonesian", "malaysian", "burmese",
    // european
    "italian", "french", "spanish", "greek", "german", "portuguese",
    "polish", "russian",
    // latin american
    "mexican", "peruvian", "brazilian", "colombian", "argentinian", "cuban",
    // middle eastern / african
    "middle eastern", "lebanese", "turkish", "moroccan", "ethiopian", "israeli",
    "mediterranean",
    // dishes and styles
    "pizza", "sushi", "burger", "bbq", "steakhouse", "seafood", "ramen",
    "pho", "tapas", "dim sum", "curry", "pasta", "noodles", "dumplings",
    "bagels", "deli", "halal", "soul food", "cajun", "creole",
    // dietary
    "vegetarian", "vegan",
];

/// Atmosphere, seating and occasion terms.
pub const VIBE_TERMS: &[&str] = &[
    "romantic", "cozy", "intimate", "date", "candlelit", "ambiance", "atmosphere",
    "date night",
    "quiet", "elegant", "fancy", "casual", "fine dining",
    "lively", "energetic", "relaxed", "chill", "vibey", "loud", "noisy",
    "buzzing", "packed",
    "trendy", "hip", "modern", "rustic", "charming", "spacious",
    "bright", "dark", "dimly", "instagram", "instagrammable",
    "outdoor", "patio", "rooftop", "garden", "sidewalk", "alfresco",
    "bar seating", "counter seating",
    "fusion", "authentic", "traditional", "homestyle", "family-style",
    "hidden gem", "local favorite", "hole in the wall",
    "group", "solo", "family", "kids", "friends",
    "brunch", "late night", "quick", "fast", "happy hour",
];

/// Price sentiment.
pub const PRICE_TERMS: &[&str] = &[
    "cheap", "affordable", "budget", "inexpensive",
    "expensive", "pricey", "upscale", "high-end",
    "value", "deal", "splurge", "reasonable",
];

/// A named set of terms sharing one boost multiplier.
///
/// Single-word terms are matched by token equality. Multi-word terms
/// ("date night", "hole in the wall") are matched as contiguous token runs,
/// so they can never match across a partial word.
#[derive(Debug, Clone)]
pub struct KeywordCategory {
    name: String,
    multiplier: usize,
    words: FxHashSet<String>,
    /// Longest first, so the most specific phrase wins at a given position.
    phrases: Vec<Vec<String>>,
}

impl KeywordCategory {
    /// Build a category from raw terms. Terms are lowercased and split on
    /// whitespace the same way queries are.
    pub fn new<I, S>(
        name: impl Into<String>,
        multiplier: usize,
        terms: I,
    ) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        if multiplier == 0 {
            return Err(LexiconError::InvalidMultiplier {
                category: name,
                multiplier,
            });
        }

        let mut normalized = Vec::new();
        for term in terms {
            let tokens = query_tokens(term.as_ref());
            if tokens.is_empty() {
                return Err(LexiconError::BlankTerm(name));
            }
            normalized.push(tokens);
        }
        if normalized.is_empty() {
            return Err(LexiconError::EmptyCategory(name));
        }

        Ok(Self::from_tokens(name, multiplier, normalized))
    }

    fn from_static(name: &str, multiplier: usize, terms: &[&str]) -> Self {
        let normalized = terms.iter().map(|term| query_tokens(term)).collect();
        Self::from_tokens(name.to_string(), multiplier, normalized)
    }

    fn from_tokens(name: String, multiplier: usize, terms: Vec<Vec<String>>) -> Self {
        let mut words = FxHashSet::default();
        let mut phrases = Vec::new();
        for mut tokens in terms {
            match tokens.len() {
                0 => {}
                1 => {
                    words.insert(tokens.remove(0));
                }
                _ => {
                    if !phrases.contains(&tokens) {
                        phrases.push(tokens);
                    }
                }
            }
        }
        // stable: equal-length phrases keep declaration order
        phrases.sort_by(|a, b| b.len().cmp(&a.len()));

        Self {
            name,
            multiplier,
            words,
            phrases,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total occurrences a matched term should have after boosting.
    pub fn multiplier(&self) -> usize {
        self.multiplier
    }

    /// Number of distinct terms (words plus phrases).
    pub fn len(&self) -> usize {
        self.words.len() + self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `term` (normalized like a query) belongs to this category.
    pub fn contains(&self, term: &str) -> bool {
        let tokens = query_tokens(term);
        match tokens.len() {
            0 => false,
            1 => self.words.contains(&tokens[0]),
            _ => self.phrases.contains(&tokens),
        }
    }

    /// Length in tokens of the term that matches at `tokens[pos]`, if any.
    /// Phrases are tried before single words.
    pub(crate) fn match_at(&self, tokens: &[String], pos: usize) -> Option<usize> {
        let rest = tokens.get(pos..)?;
        if rest.is_empty() {
            return None;
        }
        for phrase in &self.phrases {
            if rest.starts_with(phrase) {
                return Some(phrase.len());
            }
        }
        self.words.contains(&rest[0]).then_some(1)
    }
}

/// Ordered collection of keyword categories applied by [`boost_query`](crate::boost_query).
///
/// Category order determines the order of appended terms in the boosted text.
#[derive(Debug, Clone)]
pub struct Lexicon {
    categories: Vec<KeywordCategory>,
}

impl Lexicon {
    pub fn new(categories: Vec<KeywordCategory>) -> Result<Self, LexiconError> {
        for (idx, category) in categories.iter().enumerate() {
            if categories[..idx].iter().any(|c| c.name == category.name) {
                return Err(LexiconError::DuplicateCategory(category.name.clone()));
            }
        }
        Ok(Self { categories })
    }

    /// The compiled-in cuisine, vibe and price categories.
    pub fn builtin() -> Self {
        Self {
            categories: vec![
                KeywordCategory::from_static("cuisine", CUISINE_MULTIPLIER, CUISINE_TERMS),
                KeywordCategory::from_static("vibe", VIBE_MULTIPLIER, VIBE_TERMS),
                KeywordCategory::from_static("price", PRICE_MULTIPLIER, PRICE_TERMS),
            ],
        }
    }

    pub fn categories(&self) -> &[KeywordCategory] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&KeywordCategory> {
        self.categories.iter().find(|c| c.name == name)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_three_categories_in_order() {
        let lexicon = Lexicon::builtin();
        let names: Vec<&str> = lexicon.categories().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["cuisine", "vibe", "price"]);
        assert_eq!(lexicon.category("cuisine").unwrap().multiplier(), 3);
        assert_eq!(lexicon.category("vibe").unwrap().multiplier(), 2);
        assert_eq!(lexicon.category("price").unwrap().multiplier(), 2);
    }

    #[test]
    fn builtin_term_counts() {
        let lexicon = Lexicon::builtin();
        assert_eq!(lexicon.category("cuisine").unwrap().len(), CUISINE_TERMS.len());
        assert_eq!(lexicon.category("vibe").unwrap().len(), VIBE_TERMS.len());
        assert_eq!(lexicon.category("price").unwrap().len(), PRICE_TERMS.len());
    }

    #[test]
    fn contains_words_and_phrases() {
        let lexicon = Lexicon::builtin();
        let vibe = lexicon.category("vibe").unwrap();
        assert!(vibe.contains("cozy"));
        assert!(vibe.contains("Date Night"));
        assert!(vibe.contains("hole in the wall"));
        assert!(!vibe.contains("ramen"));
        assert!(!vibe.contains(""));
        assert!(lexicon.category("price").unwrap().contains("high-end"));
    }

    #[test]
    fn match_at_prefers_phrases() {
        let lexicon = Lexicon::builtin();
        let vibe = lexicon.category("vibe").unwrap();
        let tokens = query_tokens("a date night spot");
        assert_eq!(vibe.match_at(&tokens, 1), Some(2));
        assert_eq!(vibe.match_at(&tokens, 0), None);
        assert_eq!(vibe.match_at(&tokens, 4), None);

        let tokens = query_tokens("first date");
        assert_eq!(vibe.match_at(&tokens, 1), Some(1));
    }

    #[test]
    fn custom_category_validation() {
        assert_eq!(
            KeywordCategory::new("empty", 2, Vec::<&str>::new()).unwrap_err(),
            LexiconError::EmptyCategory("empty".into())
        );
        assert!(matches!(
            KeywordCategory::new("zero", 0, ["a"]),
            Err(LexiconError::InvalidMultiplier { multiplier: 0, .. })
        ));
        assert_eq!(
            KeywordCategory::new("blank", 2, ["ok", "  "]).unwrap_err(),
            LexiconError::BlankTerm("blank".into())
        );
    }

    #[test]
    fn duplicate_category_names_rejected() {
        let a = KeywordCategory::new("drinks", 2, ["wine"]).unwrap();
        let b = KeywordCategory::new("drinks", 2, ["beer"]).unwrap();
        assert_eq!(
            Lexicon::new(vec![a, b]).unwrap_err(),
            LexiconError::DuplicateCategory("drinks".into())
        );
    }
}
