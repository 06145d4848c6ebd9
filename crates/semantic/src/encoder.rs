use std::sync::Arc;

use tracing::{debug, warn};

use crate::embedder::{check_dimension, load_image_embedder, load_text_embedder};
use crate::normalize::l2_normalize_in_place;
use crate::{ImageEmbedder, QueryVector, SemanticConfig, SemanticError, TextEmbedder};

/// Fuses a text embedding and an optional image embedding into one
/// [`QueryVector`] compatible with the restaurant index.
///
/// Both models are shared read-only; `encode` may be called from many
/// threads at once.
#[derive(Clone)]
pub struct MultiModalEncoder {
    text: Arc<dyn TextEmbedder>,
    image: Option<Arc<dyn ImageEmbedder>>,
    image_dim: usize,
}

impl std::fmt::Debug for MultiModalEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiModalEncoder")
            .field("text", &self.text.name())
            .field("image", &self.image.as_ref().map(|m| m.name()))
            .field("text_dim", &self.text.dimension())
            .field("image_dim", &self.image_dim)
            .finish()
    }
}

impl MultiModalEncoder {
    /// `image_dim` is the width of the image segment, which stays present (as
    /// zeros) even when no image encoder is configured.
    pub fn new(
        text: Arc<dyn TextEmbedder>,
        image: Option<Arc<dyn ImageEmbedder>>,
        image_dim: usize,
    ) -> Result<Self, SemanticError> {
        if text.dimension() == 0 || image_dim == 0 {
            return Err(SemanticError::InvalidConfig(
                "embedding dimensions must be greater than zero".into(),
            ));
        }
        if let Some(model) = &image {
            if model.dimension() != image_dim {
                return Err(SemanticError::InvalidConfig(format!(
                    "image encoder '{}' produces {} values, expected {image_dim}",
                    model.name(),
                    model.dimension()
                )));
            }
        }
        Ok(Self {
            text,
            image,
            image_dim,
        })
    }

    /// Loads both encoders from config.
    pub async fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        let text = load_text_embedder(&cfg.text).await?;
        let image = load_image_embedder(&cfg.image).await?;
        Self::new(text, image, cfg.image.dimension)
    }

    pub fn text_dim(&self) -> usize {
        self.text.dimension()
    }

    pub fn image_dim(&self) -> usize {
        self.image_dim
    }

    pub fn dimension(&self) -> usize {
        self.text_dim() + self.image_dim
    }

    pub fn image_enabled(&self) -> bool {
        self.image.is_some()
    }

    /// Encodes `text` (which may be empty) and an optional image.
    ///
    /// A text encoder failure or a wrong-width vector from either encoder is
    /// an error. Anything else that goes wrong with the image only zeroes the
    /// image segment.
    pub fn encode(&self, text: &str, image: Option<&[u8]>) -> Result<QueryVector, SemanticError> {
        let text_vec = self.encode_text(text)?;

        let (image_vec, has_image) = match (image, &self.image) {
            (None, _) => (vec![0.0; self.image_dim], false),
            (Some(_), None) => {
                debug!("image supplied but image search is disabled");
                (vec![0.0; self.image_dim], false)
            }
            (Some(bytes), Some(_)) => match self.encode_image(bytes) {
                Ok(v) => {
                    let nonzero = v.iter().any(|&x| x != 0.0);
                    (v, nonzero)
                }
                Err(err @ SemanticError::DimensionMismatch { .. }) => return Err(err),
                Err(err) => {
                    warn!(error = %err, "image embedding failed; continuing text-only");
                    (vec![0.0; self.image_dim], false)
                }
            },
        };

        Ok(QueryVector::from_segments(text_vec, image_vec, has_image))
    }

    /// Unit-norm text segment (zeros when the model output is degenerate).
    pub fn encode_text(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let mut v = self.text.embed(text)?;
        check_dimension("text", self.text.dimension(), v.len())?;
        if !l2_normalize_in_place(&mut v) {
            debug!("text embedding has near-zero norm; emitting zero segment");
        }
        Ok(v)
    }

    /// Unit-norm image segment. Errors are returned as-is; [`encode`](Self::encode)
    /// decides which ones degrade to zeros.
    pub fn encode_image(&self, bytes: &[u8]) -> Result<Vec<f32>, SemanticError> {
        let Some(model) = &self.image else {
            return Ok(vec![0.0; self.image_dim]);
        };
        let mut v = model.embed(bytes)?;
        check_dimension("image", self.image_dim, v.len())?;
        l2_normalize_in_place(&mut v);
        Ok(v)
    }
}
