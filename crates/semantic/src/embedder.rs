use std::sync::Arc;

use onnxruntime::ndarray::Array4;
use tracing::{info, warn};

use crate::assets::{resolve_image_assets, resolve_text_assets, ModelAssets};
use crate::cache::get_or_load_model_handle;
use crate::onnx::{run_image_embedding, run_text_embedding};
use crate::stub::{StubImageEmbedder, StubTextEmbedder};
use crate::vision::ClipPreprocess;
use crate::{ImageModelConfig, SemanticError, TextModelConfig};

/// Turns query text into a raw (unnormalized) embedding.
pub trait TextEmbedder: Send + Sync {
    fn name(&self) -> &str;
    fn dimension(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError>;
}

/// Turns encoded image bytes into a raw (unnormalized) embedding.
pub trait ImageEmbedder: Send + Sync {
    fn name(&self) -> &str;
    fn dimension(&self) -> usize;
    fn embed(&self, bytes: &[u8]) -> Result<Vec<f32>, SemanticError>;
}

/// Sentence encoder backed by an ONNX export. Sessions are loaded lazily per
/// thread and reused for the life of that thread.
#[derive(Debug, Clone)]
pub struct OnnxTextEmbedder {
    name: String,
    assets: ModelAssets,
    dimension: usize,
    max_sequence_length: usize,
}

impl TextEmbedder for OnnxTextEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let handle = get_or_load_model_handle(&self.assets)?;
        run_text_embedding(handle.as_ref(), text, self.max_sequence_length)
    }
}

/// CLIP vision tower backed by an ONNX export.
#[derive(Debug, Clone)]
pub struct OnnxImageEmbedder {
    name: String,
    assets: ModelAssets,
    output_name: String,
    preprocess: ClipPreprocess,
    dimension: usize,
}

impl OnnxImageEmbedder {
    fn embed_tensor(&self, pixels: Array4<f32>) -> Result<Vec<f32>, SemanticError> {
        let handle = get_or_load_model_handle(&self.assets)?;
        run_image_embedding(handle.as_ref(), pixels, &self.output_name)
    }
}

impl ImageEmbedder for OnnxImageEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, bytes: &[u8]) -> Result<Vec<f32>, SemanticError> {
        let pixels = self.preprocess.prepare(bytes)?;
        self.embed_tensor(pixels)
    }
}

/// Builds the text encoder described by `cfg`.
///
/// In `"onnx"` mode the assets are resolved (downloading when URLs are set) and
/// one warm-up inference runs so a broken model fails here rather than on the
/// first request. Missing assets fall back to the stub only when
/// `fallback_to_stub` is set.
pub async fn load_text_embedder(
    cfg: &TextModelConfig,
) -> Result<Arc<dyn TextEmbedder>, SemanticError> {
    if cfg.dimension == 0 {
        return Err(SemanticError::InvalidConfig(
            "text dimension must be greater than zero".into(),
        ));
    }

    match cfg.mode.as_str() {
        "fast" => Ok(Arc::new(StubTextEmbedder::new(cfg.dimension))),
        "onnx" => {
            let assets = match resolve_text_assets(cfg).await {
                Ok(assets) => assets,
                Err(err) if cfg.fallback_to_stub && err.is_missing_asset() => {
                    warn!(model = %cfg.model_name, error = %err, "text model unavailable; using stub embeddings");
                    return Ok(Arc::new(StubTextEmbedder::new(cfg.dimension)));
                }
                Err(err) => return Err(err),
            };

            let embedder = OnnxTextEmbedder {
                name: cfg.model_name.clone(),
                assets,
                dimension: cfg.dimension,
                max_sequence_length: cfg.max_sequence_length,
            };
            let probe = embedder.embed("warmup")?;
            check_dimension("text", cfg.dimension, probe.len())?;
            info!(
                model = %cfg.model_name,
                path = %embedder.assets.model_path.display(),
                dimension = cfg.dimension,
                "text encoder loaded"
            );
            Ok(Arc::new(embedder))
        }
        other => Err(SemanticError::InvalidConfig(format!(
            "unknown text encoder mode '{other}'"
        ))),
    }
}

/// Builds the image encoder described by `cfg`, or `None` when image search is disabled.
pub async fn load_image_embedder(
    cfg: &ImageModelConfig,
) -> Result<Option<Arc<dyn ImageEmbedder>>, SemanticError> {
    if !cfg.enabled {
        info!("image search disabled");
        return Ok(None);
    }
    if cfg.dimension == 0 || cfg.input_size == 0 {
        return Err(SemanticError::InvalidConfig(
            "image dimension and input size must be greater than zero".into(),
        ));
    }
    if cfg.std.iter().any(|&s| s == 0.0) {
        return Err(SemanticError::InvalidConfig(
            "image normalization std must be non-zero".into(),
        ));
    }

    match cfg.mode.as_str() {
        "fast" => Ok(Some(Arc::new(StubImageEmbedder::new(cfg.dimension)))),
        "onnx" => {
            let assets = match resolve_image_assets(cfg).await {
                Ok(assets) => assets,
                Err(err) if cfg.fallback_to_stub && err.is_missing_asset() => {
                    warn!(model = %cfg.model_name, error = %err, "image model unavailable; using stub embeddings");
                    return Ok(Some(Arc::new(StubImageEmbedder::new(cfg.dimension))));
                }
                Err(err) => return Err(err),
            };

            let preprocess = ClipPreprocess::from_config(cfg);
            let size = preprocess.size() as usize;
            let embedder = OnnxImageEmbedder {
                name: cfg.model_name.clone(),
                assets,
                output_name: cfg.output_name.clone(),
                preprocess,
                dimension: cfg.dimension,
            };
            let probe = embedder.embed_tensor(Array4::zeros((1, 3, size, size)))?;
            check_dimension("image", cfg.dimension, probe.len())?;
            info!(
                model = %cfg.model_name,
                path = %embedder.assets.model_path.display(),
                dimension = cfg.dimension,
                "image encoder loaded"
            );
            Ok(Some(Arc::new(embedder)))
        }
        other => Err(SemanticError::InvalidConfig(format!(
            "unknown image encoder mode '{other}'"
        ))),
    }
}

pub(crate) fn check_dimension(
    modality: &'static str,
    expected: usize,
    got: usize,
) -> Result<(), SemanticError> {
    if expected != got {
        return Err(SemanticError::DimensionMismatch {
            modality,
            expected,
            got,
        });
    }
    Ok(())
}
