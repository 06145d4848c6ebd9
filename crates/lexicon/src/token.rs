/// Splits `text` on whitespace, lowercases each piece and trims punctuation
/// from both ends.
///
/// Inner punctuation survives, so `"high-end,"` becomes `"high-end"` and
/// `"Hell's"` becomes `"hell's"`. Pieces that are pure punctuation are
/// dropped.
pub fn query_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
