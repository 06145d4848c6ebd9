use once_cell::sync::OnceCell;
use onnxruntime::{environment::Environment, session::Session};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tokenizers::Tokenizer;

use crate::assets::ModelAssets;
use crate::SemanticError;

static ORT_ENV: OnceCell<Environment> = OnceCell::new();

thread_local! {
    static MODEL_CACHE: RefCell<HashMap<ModelAssets, Rc<CachedModel>>> =
        RefCell::new(HashMap::new());
}

/// A loaded session plus its tokenizer (text encoders only).
pub(crate) struct CachedModel {
    pub(crate) tokenizer: Option<Tokenizer>,
    pub(crate) session: RefCell<Session<'static>>,
}

impl CachedModel {
    fn load(assets: &ModelAssets) -> Result<Self, SemanticError> {
        let tokenizer = assets
            .tokenizer_path
            .as_ref()
            .map(|path| {
                Tokenizer::from_file(path).map_err(|e| SemanticError::Inference(e.to_string()))
            })
            .transpose()?;

        let env = ort_environment()?;
        let session = env
            .new_session_builder()
            .map_err(|e| SemanticError::Inference(e.to_string()))?
            .with_model_from_file(assets.model_path.clone())
            .map_err(|e| SemanticError::Inference(e.to_string()))?;

        Ok(Self {
            tokenizer,
            session: RefCell::new(session),
        })
    }

    pub(crate) fn tokenizer(&self) -> Result<&Tokenizer, SemanticError> {
        self.tokenizer
            .as_ref()
            .ok_or_else(|| SemanticError::TokenizerMissing("text encoder loaded without tokenizer".into()))
    }
}

/// Returns this thread's session for `assets`, loading it on first use.
pub(crate) fn get_or_load_model_handle(
    assets: &ModelAssets,
) -> Result<Rc<CachedModel>, SemanticError> {
    MODEL_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(handle) = cache.get(assets) {
            return Ok(handle.clone());
        }

        let handle = Rc::new(CachedModel::load(assets)?);
        cache.insert(assets.clone(), handle.clone());
        Ok(handle)
    })
}

fn ort_environment() -> Result<&'static Environment, SemanticError> {
    ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("vibecheck")
            .build()
            .map_err(|e| SemanticError::Inference(e.to_string()))
    })
}
