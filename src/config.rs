//! YAML configuration for the VibeCheck search pipeline.
//!
//! One file describes every stage: the text and image encoders, the vector
//! index file pair, the restaurant database and the over-fetch knobs. Every
//! field has a default, so an empty file (or `VibeCheckConfig::default()`)
//! matches the standard deployment layout.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "production"
//!
//! semantic:
//!   text:
//!     mode: "onnx"
//!     model_path: "./models/all-MiniLM-L6-v2/model.onnx"
//!     tokenizer_path: "./models/all-MiniLM-L6-v2/tokenizer.json"
//!     dimension: 384
//!   image:
//!     enabled: true
//!     model_path: "./models/clip-vit-b-32/vision_model.onnx"
//!     dimension: 512
//!
//! index:
//!   index_path: "vibecheck_full_output/vibecheck_index.faiss"
//!   ids_path: "vibecheck_full_output/meta_ids.npy"
//!   backend: "flat"
//!
//! store:
//!   path: "vibecheck_full_output/vibecheck.db"
//!   review_limit: 10
//!
//! search:
//!   overfetch_factor: 5
//!   overfetch_on_price: true
//! ```

use std::fs;
use std::path::Path;

use index::IndexConfig;
use matcher::SearchConfig;
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use store::StoreConfig;
use thiserror::Error;

const ENCODER_MODES: [&str; 2] = ["onnx", "fast"];

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the search pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VibeCheckConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for VibeCheckConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            semantic: SemanticConfig::default(),
            index: IndexConfig::default(),
            store: StoreConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl VibeCheckConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: VibeCheckConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Width of the query vector the configured encoders produce.
    pub fn query_dimension(&self) -> usize {
        self.semantic.text.dimension + self.semantic.image.dimension
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        let text = &self.semantic.text;
        let image = &self.semantic.image;
        if !ENCODER_MODES.contains(&text.mode.as_str()) {
            return Err(ConfigLoadError::Validation(format!(
                "semantic.text.mode must be one of {ENCODER_MODES:?}, got {:?}",
                text.mode
            )));
        }
        if !ENCODER_MODES.contains(&image.mode.as_str()) {
            return Err(ConfigLoadError::Validation(format!(
                "semantic.image.mode must be one of {ENCODER_MODES:?}, got {:?}",
                image.mode
            )));
        }
        if text.dimension == 0 || image.dimension == 0 {
            return Err(ConfigLoadError::Validation(
                "semantic dimensions must be >= 1".to_string(),
            ));
        }
        if text.max_sequence_length == 0 {
            return Err(ConfigLoadError::Validation(
                "semantic.text.max_sequence_length must be >= 1".to_string(),
            ));
        }
        if self.index.dimension != 0 && self.index.dimension != self.query_dimension() {
            return Err(ConfigLoadError::Validation(format!(
                "index.dimension is {} but the encoders produce {} + {} = {}",
                self.index.dimension,
                text.dimension,
                image.dimension,
                self.query_dimension()
            )));
        }

        self.index
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.store
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.search
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        Ok(())
    }
}

fn default_version() -> String {
    "1.0".to_string()
}
