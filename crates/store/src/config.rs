use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Where restaurant records live and how much of each record is hydrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// Reviews attached to each record, most liked first.
    pub review_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("vibecheck_full_output/vibecheck.db"),
            review_limit: 10,
        }
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_review_limit(mut self, review_limit: usize) -> Self {
        self.review_limit = review_limit;
        self
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.path.as_os_str().is_empty() {
            return Err(StoreError::InvalidConfig("path must not be empty".into()));
        }
        Ok(())
    }
}
