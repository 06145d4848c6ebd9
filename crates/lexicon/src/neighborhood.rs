//! Neighborhood resolution for Manhattan queries and addresses.

use fxhash::FxHashMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LexiconError;
use crate::token::query_tokens;

/// Variant spelling → canonical neighborhood name.
pub const NEIGHBORHOOD_VARIANTS: &[(&str, &str)] = &[
    ("soho", "SoHo"),
    ("so ho", "SoHo"),
    ("south of houston", "SoHo"),
    ("tribeca", "Tribeca"),
    ("tri beca", "Tribeca"),
    ("triangle below canal", "Tribeca"),
    ("west village", "West Village"),
    ("greenwich village", "West Village"),
    ("the village", "West Village"),
    ("east village", "East Village"),
    ("ev", "East Village"),
    ("lower east side", "Lower East Side"),
    ("les", "Lower East Side"),
    ("lowereast", "Lower East Side"),
    ("upper east side", "Upper East Side"),
    ("ues", "Upper East Side"),
    ("uppereast", "Upper East Side"),
    ("upper west side", "Upper West Side"),
    ("uws", "Upper West Side"),
    ("upperwest", "Upper West Side"),
    ("hells kitchen", "Hell's Kitchen"),
    ("hell's kitchen", "Hell's Kitchen"),
    ("clinton", "Hell's Kitchen"),
    ("chelsea", "Chelsea"),
    ("gramercy", "Gramercy"),
    ("gramercy park", "Gramercy"),
    ("murray hill", "Murray Hill"),
    ("midtown", "Midtown"),
    ("midtown manhattan", "Midtown"),
    ("financial district", "Financial District"),
    ("fidi", "Financial District"),
    ("wall street", "Financial District"),
    ("battery park", "Battery Park City"),
    ("battery park city", "Battery Park City"),
    ("washington heights", "Washington Heights"),
    ("wash heights", "Washington Heights"),
    ("inwood", "Inwood"),
    ("harlem", "Central Harlem"),
    ("central harlem", "Central Harlem"),
    ("east harlem", "East Harlem"),
    ("spanish harlem", "East Harlem"),
    ("el barrio", "East Harlem"),
    ("morningside heights", "Morningside Heights"),
    ("morningside", "Morningside Heights"),
];

/// Manhattan zip code → canonical neighborhood name.
pub const ZIP_NEIGHBORHOODS: &[(&str, &str)] = &[
    ("10031", "Washington Heights"),
    ("10032", "Washington Heights"),
    ("10033", "Washington Heights"),
    ("10034", "Inwood"),
    ("10040", "Inwood"),
    ("10026", "Central Harlem"),
    ("10027", "Morningside Heights"),
    ("10030", "Central Harlem"),
    ("10037", "Central Harlem"),
    ("10039", "Central Harlem"),
    ("10029", "East Harlem"),
    ("10035", "East Harlem"),
    ("10023", "Upper West Side"),
    ("10024", "Upper West Side"),
    ("10025", "Upper West Side"),
    ("10021", "Upper East Side"),
    ("10028", "Upper East Side"),
    ("10044", "Upper East Side"),
    ("10128", "Upper East Side"),
    ("10001", "Chelsea"),
    ("10011", "Chelsea"),
    ("10018", "Hell's Kitchen"),
    ("10019", "Hell's Kitchen"),
    ("10020", "Midtown"),
    ("10036", "Hell's Kitchen"),
    ("10010", "Gramercy"),
    ("10016", "Murray Hill"),
    ("10017", "Murray Hill"),
    ("10022", "Gramercy"),
    ("10012", "SoHo"),
    ("10013", "Tribeca"),
    ("10014", "West Village"),
    ("10002", "Lower East Side"),
    ("10003", "East Village"),
    ("10009", "East Village"),
    ("10004", "Financial District"),
    ("10005", "Financial District"),
    ("10006", "Financial District"),
    ("10007", "Financial District"),
    ("10038", "Lower Manhattan"),
    ("10280", "Battery Park City"),
];

static ZIP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{5})\b").expect("zip pattern is valid"));

/// First standalone five-digit group in `address`.
pub fn extract_zip(address: &str) -> Option<&str> {
    ZIP_PATTERN
        .captures(address)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone)]
struct Variant {
    tokens: Vec<String>,
    key_len: usize,
    canonical: String,
}

/// Maps free text to a canonical neighborhood label.
///
/// Resolution order:
/// 1. The whole (trimmed, lowercased) query equals a variant key.
/// 2. A variant key occurs in the query as a contiguous run of whole words.
///    When several keys occur, the longest key wins ("east harlem" over
///    "harlem"); equal lengths fall back to table order.
///
/// Substring hits inside words are ignored, so "tables" does not resolve to
/// the Lower East Side via "les".
#[derive(Debug, Clone)]
pub struct NeighborhoodResolver {
    variants: Vec<Variant>,
    exact: FxHashMap<String, usize>,
    zips: FxHashMap<String, String>,
}

impl NeighborhoodResolver {
    /// Build a resolver from custom tables.
    pub fn new<V, Z>(variants: V, zips: Z) -> Result<Self, LexiconError>
    where
        V: IntoIterator<Item = (String, String)>,
        Z: IntoIterator<Item = (String, String)>,
    {
        let mut resolver = Self {
            variants: Vec::new(),
            exact: FxHashMap::default(),
            zips: FxHashMap::default(),
        };
        for (key, canonical) in variants {
            if key.trim().is_empty() || canonical.trim().is_empty() {
                return Err(LexiconError::BlankVariant(key));
            }
            resolver.push_variant(&key, canonical);
        }
        for (zip, canonical) in zips {
            resolver.zips.insert(zip, canonical);
        }
        Ok(resolver)
    }

    /// The compiled-in Manhattan tables.
    pub fn builtin() -> Self {
        let mut resolver = Self {
            variants: Vec::with_capacity(NEIGHBORHOOD_VARIANTS.len()),
            exact: FxHashMap::default(),
            zips: FxHashMap::default(),
        };
        for (key, canonical) in NEIGHBORHOOD_VARIANTS {
            resolver.push_variant(key, canonical.to_string());
        }
        resolver.zips = ZIP_NEIGHBORHOODS
            .iter()
            .map(|(zip, name)| (zip.to_string(), name.to_string()))
            .collect();
        resolver
    }

    fn push_variant(&mut self, key: &str, canonical: String) {
        let lowered = key.trim().to_lowercase();
        let idx = self.variants.len();
        self.exact.entry(lowered.clone()).or_insert(idx);
        self.variants.push(Variant {
            tokens: query_tokens(&lowered),
            key_len: lowered.chars().count(),
            canonical,
        });
    }

    /// Canonical neighborhood mentioned in `query`, or `None`.
    pub fn resolve(&self, query: &str) -> Option<&str> {
        let lowered = query.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        if let Some(&idx) = self.exact.get(&lowered) {
            return Some(self.variants[idx].canonical.as_str());
        }

        let tokens = query_tokens(&lowered);
        let mut best: Option<&Variant> = None;
        for variant in &self.variants {
            if variant.tokens.is_empty() || !contains_run(&tokens, &variant.tokens) {
                continue;
            }
            if best.map_or(true, |current| variant.key_len > current.key_len) {
                best = Some(variant);
            }
        }
        let resolved = best.map(|variant| variant.canonical.as_str());
        tracing::trace!(query, neighborhood = ?resolved, "resolved neighborhood");
        resolved
    }

    pub fn neighborhood_for_zip(&self, zip: &str) -> Option<&str> {
        self.zips.get(zip).map(String::as_str)
    }

    /// Neighborhood for the zip code embedded in a street address.
    pub fn neighborhood_for_address(&self, address: &str) -> Option<&str> {
        extract_zip(address).and_then(|zip| self.neighborhood_for_zip(zip))
    }

    /// Distinct canonical names known to the resolver, in table order.
    pub fn canonical_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for variant in &self.variants {
            if !names.contains(&variant.canonical.as_str()) {
                names.push(&variant.canonical);
            }
        }
        names
    }
}

impl Default for NeighborhoodResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_abbreviation() {
        let resolver = NeighborhoodResolver::default();
        assert_eq!(resolver.resolve("les"), Some("Lower East Side"));
        assert_eq!(resolver.resolve("  UWS "), Some("Upper West Side"));
        assert_eq!(resolver.resolve("FiDi"), Some("Financial District"));
    }

    #[test]
    fn embedded_mention() {
        let resolver = NeighborhoodResolver::default();
        assert_eq!(resolver.resolve("I want soho food"), Some("SoHo"));
        assert_eq!(
            resolver.resolve("cheap ramen in the east village"),
            Some("East Village")
        );
        assert_eq!(
            resolver.resolve("dinner near wall street?"),
            Some("Financial District")
        );
    }

    #[test]
    fn no_mention() {
        let resolver = NeighborhoodResolver::default();
        assert_eq!(resolver.resolve("generic query"), None);
        assert_eq!(resolver.resolve(""), None);
        assert_eq!(resolver.resolve("   "), None);
    }

    #[test]
    fn longest_key_wins() {
        let resolver = NeighborhoodResolver::default();
        assert_eq!(resolver.resolve("tacos in east harlem"), Some("East Harlem"));
        assert_eq!(resolver.resolve("harlem soul food"), Some("Central Harlem"));
        assert_eq!(
            resolver.resolve("brunch in midtown manhattan"),
            Some("Midtown")
        );
        assert_eq!(
            resolver.resolve("battery park city views"),
            Some("Battery Park City")
        );
    }

    #[test]
    fn ignores_hits_inside_words() {
        let resolver = NeighborhoodResolver::default();
        assert_eq!(resolver.resolve("outdoor tables"), None);
        assert_eq!(resolver.resolve("clever cocktails"), None);
    }

    #[test]
    fn apostrophes_survive() {
        let resolver = NeighborhoodResolver::default();
        assert_eq!(
            resolver.resolve("pizza in Hell's Kitchen"),
            Some("Hell's Kitchen")
        );
        assert_eq!(
            resolver.resolve("pizza in hells kitchen"),
            Some("Hell's Kitchen")
        );
    }

    #[test]
    fn zip_lookup() {
        let resolver = NeighborhoodResolver::default();
        assert_eq!(resolver.neighborhood_for_zip("10003"), Some("East Village"));
        assert_eq!(resolver.neighborhood_for_zip("10012"), Some("SoHo"));
        assert_eq!(resolver.neighborhood_for_zip("99999"), None);
        assert_eq!(
            resolver.neighborhood_for_address("112 Avenue A, New York, NY 10009"),
            Some("East Village")
        );
        assert_eq!(resolver.neighborhood_for_address("no zip here"), None);
    }

    #[test]
    fn extract_zip_requires_word_boundaries() {
        assert_eq!(extract_zip("1 Main St, NY 10002"), Some("10002"));
        assert_eq!(extract_zip("Suite 123456, NY"), None);
        assert_eq!(extract_zip(""), None);
    }

    #[test]
    fn custom_tables() {
        let resolver = NeighborhoodResolver::new(
            vec![("dumbo".to_string(), "DUMBO".to_string())],
            vec![("11201".to_string(), "DUMBO".to_string())],
        )
        .unwrap();
        assert_eq!(resolver.resolve("coffee in dumbo"), Some("DUMBO"));
        assert_eq!(resolver.neighborhood_for_zip("11201"), Some("DUMBO"));
        assert_eq!(resolver.resolve("soho"), None);
    }

    #[test]
    fn blank_variant_rejected() {
        let err = NeighborhoodResolver::new(
            vec![(" ".to_string(), "Nowhere".to_string())],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, LexiconError::BlankVariant(_)));
    }

    #[test]
    fn canonical_names_are_distinct() {
        let resolver = NeighborhoodResolver::default();
        let names = resolver.canonical_names();
        assert_eq!(names[0], "SoHo");
        assert!(names.contains(&"East Village"));
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }
}
