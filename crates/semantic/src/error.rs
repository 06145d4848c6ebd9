use std::io;
use thiserror::Error;

/// Why an uploaded image could not be turned into pixels.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageDecodeError {
    #[error("image payload is empty")]
    Empty,
    #[error("unsupported or corrupt image: {0}")]
    Format(String),
    #[error("image has zero area ({width}x{height})")]
    ZeroArea { width: u32, height: u32 },
}

/// Errors surfaced while loading encoders or embedding a query.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// The ONNX model could not be located locally and no URL was provided.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The tokenizer JSON is missing and there was no remote URL to fetch it from.
    #[error("tokenizer missing: {0}")]
    TokenizerMissing(String),
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    #[error("download failed: {0}")]
    Download(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// ONNX Runtime or tokenizer failures.
    #[error("inference failure: {0}")]
    Inference(String),
    #[error("image decode failed: {0}")]
    ImageDecode(#[from] ImageDecodeError),
    /// An encoder produced a vector of the wrong width.
    #[error("{modality} embedding has dimension {got}, expected {expected}")]
    DimensionMismatch {
        modality: &'static str,
        expected: usize,
        got: usize,
    },
}

impl SemanticError {
    /// Missing assets, as opposed to broken ones. Only these may fall back to the stub.
    pub(crate) fn is_missing_asset(&self) -> bool {
        matches!(
            self,
            SemanticError::ModelNotFound(_)
                | SemanticError::TokenizerMissing(_)
                | SemanticError::Download(_)
        )
    }
}
