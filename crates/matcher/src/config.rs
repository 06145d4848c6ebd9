use serde::{Deserialize, Serialize};

use crate::MatchError;

/// Knobs for the over-fetch strategy and request defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Multiplier on `k` when a filter may discard candidates. Applied once
    /// however many filters are active.
    pub overfetch_factor: usize,
    /// Whether a price filter alone triggers over-fetch.
    pub overfetch_on_price: bool,
    pub default_k_json: usize,
    pub default_k_form: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            overfetch_factor: 5,
            overfetch_on_price: true,
            default_k_json: 20,
            default_k_form: 9,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.overfetch_factor == 0 {
            return Err(MatchError::InvalidConfig(
                "overfetch_factor must be at least 1".into(),
            ));
        }
        if self.default_k_json == 0 || self.default_k_form == 0 {
            return Err(MatchError::InvalidConfig("default k must be at least 1".into()));
        }
        Ok(())
    }

    /// Candidates to ask the index for, before clamping to its size.
    pub fn fetch_count(&self, k: usize, neighborhood_active: bool, price_active: bool) -> usize {
        let filtered = neighborhood_active || (price_active && self.overfetch_on_price);
        if filtered {
            k.saturating_mul(self.overfetch_factor)
        } else {
            k
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = SearchConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.default_k_json, 20);
        assert_eq!(cfg.default_k_form, 9);
    }

    #[test]
    fn zero_values_rejected() {
        let cfg = SearchConfig {
            overfetch_factor: 0,
            ..SearchConfig::default()
        };
        match cfg.validate() {
            Err(MatchError::InvalidConfig(msg)) => assert!(msg.contains("overfetch_factor")),
            other => panic!("unexpected: {other:?}"),
        }
        let cfg = SearchConfig {
            default_k_form: 0,
            ..SearchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn fetch_count_applies_factor_once() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.fetch_count(20, true, false), 100);
        assert_eq!(cfg.fetch_count(5, true, true), 25);
        assert_eq!(cfg.fetch_count(5, false, true), 25);
        assert_eq!(cfg.fetch_count(5, false, false), 5);

        let strict = SearchConfig {
            overfetch_on_price: false,
            ..cfg
        };
        assert_eq!(strict.fetch_count(5, false, true), 5);
        assert_eq!(strict.fetch_count(5, true, true), 25);
    }
}
