use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{ImageModelConfig, SemanticError, TextModelConfig};

/// Local files backing one ONNX encoder. Doubles as the per-thread session cache key.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub(crate) struct ModelAssets {
    pub(crate) model_path: PathBuf,
    pub(crate) tokenizer_path: Option<PathBuf>,
}

/// Ensures the sentence encoder and its tokenizer exist locally, downloading them when URLs are provided.
pub(crate) async fn resolve_text_assets(
    cfg: &TextModelConfig,
) -> Result<ModelAssets, SemanticError> {
    let model_path = ensure_local_file(&cfg.model_path, cfg.model_url.as_deref(), || {
        SemanticError::ModelNotFound(cfg.model_path.display().to_string())
    })
    .await?;

    let tokenizer_target = tokenizer_storage_path(cfg)?;
    let tokenizer_path = ensure_local_file(&tokenizer_target, cfg.tokenizer_url.as_deref(), || {
        SemanticError::TokenizerMissing(tokenizer_target.display().to_string())
    })
    .await?;

    Ok(ModelAssets {
        model_path,
        tokenizer_path: Some(tokenizer_path),
    })
}

/// The vision tower needs no tokenizer.
pub(crate) async fn resolve_image_assets(
    cfg: &ImageModelConfig,
) -> Result<ModelAssets, SemanticError> {
    let model_path = ensure_local_file(&cfg.model_path, cfg.model_url.as_deref(), || {
        SemanticError::ModelNotFound(cfg.model_path.display().to_string())
    })
    .await?;

    Ok(ModelAssets {
        model_path,
        tokenizer_path: None,
    })
}

/// Determines where the tokenizer should be stored. When no explicit path is supplied we infer a
/// filename from the remote URL and place it next to the model file.
fn tokenizer_storage_path(cfg: &TextModelConfig) -> Result<PathBuf, SemanticError> {
    if let Some(path) = &cfg.tokenizer_path {
        return Ok(path.clone());
    }

    if let Some(url) = &cfg.tokenizer_url {
        let inferred_name = infer_filename_from_url(url).unwrap_or_else(|| "tokenizer.json".into());
        let base_dir = cfg
            .model_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        return Ok(base_dir.join(inferred_name));
    }

    Err(SemanticError::TokenizerMissing(cfg.model_name.clone()))
}

/// Returns `target` if it already exists, otherwise attempts to download `remote_url`.
async fn ensure_local_file<F>(
    target: &Path,
    remote_url: Option<&str>,
    on_missing: F,
) -> Result<PathBuf, SemanticError>
where
    F: FnOnce() -> SemanticError,
{
    if target.exists() {
        return Ok(target.to_path_buf());
    }

    if let Some(url) = remote_url {
        download_to_path(target, url).await?;
        return Ok(target.to_path_buf());
    }

    Err(on_missing())
}

async fn download_to_path(target: &Path, url: &str) -> Result<(), SemanticError> {
    if let Some(parent) = target.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    info!(url, target = %target.display(), "downloading model asset");
    let response = reqwest::get(url)
        .await
        .map_err(|e| SemanticError::Download(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SemanticError::Download(format!(
            "unexpected status {status} while fetching {url}"
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| SemanticError::Download(e.to_string()))?;

    fs::write(target, &bytes)?;
    Ok(())
}

/// Extracts a filename from the provided URL, stripping query/fragment parts.
fn infer_filename_from_url(url: &str) -> Option<String> {
    url.split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.split(['?', '#']).next().unwrap_or(segment))
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_from_url() {
        assert_eq!(
            infer_filename_from_url("https://hf.co/org/model/resolve/main/tokenizer.json?download=1"),
            Some("tokenizer.json".into())
        );
        assert_eq!(
            infer_filename_from_url("https://host/path/vocab.json#frag"),
            Some("vocab.json".into())
        );
        assert_eq!(
            infer_filename_from_url("https://host/dir/"),
            Some("dir".into())
        );
    }

    #[test]
    fn tokenizer_path_defaults_next_to_model() {
        let cfg = TextModelConfig {
            model_path: PathBuf::from("/models/minilm/model.onnx"),
            tokenizer_path: None,
            tokenizer_url: Some("https://host/minilm/tok.json".into()),
            ..Default::default()
        };
        assert_eq!(
            tokenizer_storage_path(&cfg).unwrap(),
            PathBuf::from("/models/minilm/tok.json")
        );
    }

    #[test]
    fn tokenizer_path_missing_everywhere() {
        let cfg = TextModelConfig {
            tokenizer_path: None,
            tokenizer_url: None,
            ..Default::default()
        };
        assert!(matches!(
            tokenizer_storage_path(&cfg),
            Err(SemanticError::TokenizerMissing(_))
        ));
    }

    #[tokio::test]
    async fn existing_files_resolve_without_download() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.onnx");
        let tokenizer = dir.path().join("tokenizer.json");
        fs::write(&model, b"onnx").unwrap();
        fs::write(&tokenizer, b"{}").unwrap();

        let cfg = TextModelConfig {
            model_path: model.clone(),
            tokenizer_path: Some(tokenizer.clone()),
            ..Default::default()
        };
        let assets = resolve_text_assets(&cfg).await.unwrap();
        assert_eq!(assets.model_path, model);
        assert_eq!(assets.tokenizer_path, Some(tokenizer));
    }

    #[tokio::test]
    async fn missing_model_without_url_is_reported() {
        let cfg = ImageModelConfig {
            model_path: PathBuf::from("./does/not/exist/vision.onnx"),
            model_url: None,
            ..Default::default()
        };
        let err = resolve_image_assets(&cfg).await.unwrap_err();
        assert!(matches!(err, SemanticError::ModelNotFound(_)));
    }
}
