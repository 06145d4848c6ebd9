use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sentence-encoder settings for the text half of the query vector.
///
/// # Example
/// ```
/// use semantic::TextModelConfig;
///
/// let cfg = TextModelConfig {
///     mode: "fast".into(),
///     ..Default::default()
/// };
/// assert_eq!(cfg.dimension, 384);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextModelConfig {
    /// `"onnx"` runs the sentence encoder locally; `"fast"` uses the deterministic stub.
    pub mode: String,
    /// Label used in logs.
    pub model_name: String,
    /// Local path of the exported encoder (also the download target for `model_url`).
    pub model_path: PathBuf,
    /// Fetched when `model_path` does not exist.
    pub model_url: Option<String>,
    /// Path to `tokenizer.json`. When absent the file is placed next to the model,
    /// named after the last segment of `tokenizer_url`.
    pub tokenizer_path: Option<PathBuf>,
    pub tokenizer_url: Option<String>,
    /// Longer inputs are truncated.
    pub max_sequence_length: usize,
    /// Width of the produced embedding.
    pub dimension: usize,
    /// Serve stub embeddings instead of failing when the model assets cannot be resolved.
    pub fallback_to_stub: bool,
}

impl Default for TextModelConfig {
    fn default() -> Self {
        Self {
            mode: "onnx".into(),
            model_name: "all-MiniLM-L6-v2".into(),
            model_path: PathBuf::from("./models/all-MiniLM-L6-v2/model.onnx"),
            model_url: None,
            tokenizer_path: Some(PathBuf::from("./models/all-MiniLM-L6-v2/tokenizer.json")),
            tokenizer_url: None,
            max_sequence_length: 256,
            dimension: 384,
            fallback_to_stub: false,
        }
    }
}

/// Vision-encoder settings for the image half of the query vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageModelConfig {
    /// When false every query gets an all-zero image segment.
    pub enabled: bool,
    /// `"onnx"` or `"fast"`.
    pub mode: String,
    pub model_name: String,
    pub model_path: PathBuf,
    pub model_url: Option<String>,
    /// Graph output holding the projected image embedding. The first output is
    /// used when no output carries this name.
    pub output_name: String,
    /// Square input resolution expected by the vision tower.
    pub input_size: u32,
    /// Per-channel RGB normalization applied after scaling pixels to [0, 1].
    pub mean: [f32; 3],
    pub std: [f32; 3],
    pub dimension: usize,
    pub fallback_to_stub: bool,
}

impl Default for ImageModelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: "onnx".into(),
            model_name: "clip-vit-b-32".into(),
            model_path: PathBuf::from("./models/clip-vit-b-32/vision_model.onnx"),
            model_url: None,
            output_name: "image_embeds".into(),
            input_size: 224,
            mean: [0.481_454_66, 0.457_827_5, 0.408_210_73],
            std: [0.268_629_54, 0.261_302_58, 0.275_777_11],
            dimension: 512,
            fallback_to_stub: false,
        }
    }
}

/// Both encoders. The query vector is `text.dimension + image.dimension` wide.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    pub text: TextModelConfig,
    pub image: ImageModelConfig,
}

impl SemanticConfig {
    /// Deterministic stub encoders with the production dimensions. Useful in
    /// tests and local development without model weights.
    pub fn stub() -> Self {
        Self {
            text: TextModelConfig {
                mode: "fast".into(),
                ..Default::default()
            },
            image: ImageModelConfig {
                mode: "fast".into(),
                ..Default::default()
            },
        }
    }

    pub fn dimension(&self) -> usize {
        self.text.dimension + self.image.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dimensions() {
        let cfg = SemanticConfig::default();
        assert_eq!(cfg.text.dimension, 384);
        assert_eq!(cfg.image.dimension, 512);
        assert_eq!(cfg.dimension(), 896);
        assert!(cfg.image.enabled);
        assert_eq!(cfg.text.mode, "onnx");
    }

    #[test]
    fn clip_preprocessing_defaults() {
        let cfg = ImageModelConfig::default();
        assert_eq!(cfg.input_size, 224);
        assert!((cfg.mean[0] - 0.481_454_66).abs() < 1e-7);
        assert!((cfg.std[2] - 0.275_777_11).abs() < 1e-7);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SemanticConfig =
            serde_json::from_str(r#"{"text": {"mode": "fast"}, "image": {"enabled": false}}"#)
                .unwrap();
        assert_eq!(cfg.text.mode, "fast");
        assert_eq!(cfg.text.dimension, 384);
        assert!(!cfg.image.enabled);
        assert_eq!(cfg.image.dimension, 512);
    }

    #[test]
    fn stub_config_uses_fast_mode() {
        let cfg = SemanticConfig::stub();
        assert_eq!(cfg.text.mode, "fast");
        assert_eq!(cfg.image.mode, "fast");
        assert_eq!(cfg.dimension(), 896);
    }
}
