use crate::keywords::{KeywordCategory, Lexicon};
use crate::token::query_tokens;

/// Rewrites `text` so that lexicon terms carry more weight in a sentence
/// embedding.
///
/// For every category (in lexicon order) the matched terms, in query order,
/// are appended `multiplier - 1` more times. A term matched once in a ×3
/// category therefore appears three times in the result. The original text
/// is kept verbatim as the prefix; appended terms are lowercase.
///
/// Text without any lexicon term, including empty text, is returned
/// unchanged. This function never fails.
pub fn boost_query(text: &str, lexicon: &Lexicon) -> String {
    let tokens = query_tokens(text);
    if tokens.is_empty() {
        return text.to_string();
    }

    let mut boosted = text.to_string();
    for category in lexicon.categories() {
        let repeats = category.multiplier().saturating_sub(1);
        if repeats == 0 {
            continue;
        }
        let matched = matched_terms(&tokens, category);
        if matched.is_empty() {
            continue;
        }

        let suffix = matched.join(" ");
        for _ in 0..repeats {
            boosted.push(' ');
            boosted.push_str(&suffix);
        }
    }
    boosted
}

/// Terms of `category` found in `tokens`, left to right. A phrase consumes
/// its tokens, so "date night" is not also counted as "date".
fn matched_terms(tokens: &[String], category: &KeywordCategory) -> Vec<String> {
    let mut matched = Vec::new();
    let mut pos = 0;
    while pos < tokens.len() {
        match category.match_at(tokens, pos) {
            Some(span) => {
                matched.push(tokens[pos..pos + span].join(" "));
                pos += span;
            }
            None => pos += 1,
        }
    }
    matched
}
