use onnxruntime::ndarray::{Array, Array2, Array4};
use onnxruntime::session::Session;
use std::cell::RefCell;
use tokenizers::Tokenizer;

use crate::cache::CachedModel;
use crate::SemanticError;

/// Sentence embedding for one text: tokenize, run, mean-pool over the attention mask.
pub(crate) fn run_text_embedding(
    handle: &CachedModel,
    text: &str,
    max_sequence_length: usize,
) -> Result<Vec<f32>, SemanticError> {
    let (encoded, max_len) = encode_documents(handle.tokenizer()?, &[text], max_sequence_length)?;
    let (input_ids, attn_mask) = build_padded_arrays(encoded, max_len)?;
    let mut vectors = execute_text_session(&handle.session, input_ids, attn_mask)?;
    vectors
        .pop()
        .ok_or_else(|| SemanticError::Inference("model returned no outputs".into()))
}

/// Runs the vision tower on a preprocessed `[1, 3, H, W]` tensor and returns the
/// output named `output_name` (the first output when no name matches).
pub(crate) fn run_image_embedding(
    handle: &CachedModel,
    pixels: Array4<f32>,
    output_name: &str,
) -> Result<Vec<f32>, SemanticError> {
    let mut guard = handle.session.borrow_mut();
    let session = &mut *guard;
    if session.inputs.is_empty() {
        return Err(SemanticError::Inference(
            "model did not declare any inputs".into(),
        ));
    }
    let output_index = session
        .outputs
        .iter()
        .position(|output| output.name == output_name)
        .unwrap_or(0);

    let outputs = session
        .run::<f32, f32, _>(vec![pixels])
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    let tensor = outputs
        .into_iter()
        .nth(output_index)
        .ok_or_else(|| SemanticError::Inference("model returned no outputs".into()))?;
    Ok(tensor.iter().copied().collect())
}

struct EncodedDoc {
    ids: Vec<i64>,
    mask: Vec<i64>,
}

fn encode_documents<T>(
    tokenizer: &Tokenizer,
    texts: &[T],
    max_sequence_length: usize,
) -> Result<(Vec<EncodedDoc>, usize), SemanticError>
where
    T: AsRef<str>,
{
    let mut encoded = Vec::with_capacity(texts.len());
    let mut max_len = 0usize;

    for text in texts {
        let encoding = tokenizer
            .encode(text.as_ref(), true)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;
        let mut ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let mut mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| x as i64)
            .collect();
        ids.truncate(max_sequence_length);
        mask.truncate(max_sequence_length);
        max_len = max_len.max(ids.len());
        encoded.push(EncodedDoc { ids, mask });
    }

    Ok((encoded, max_len))
}

fn build_padded_arrays(
    encoded: Vec<EncodedDoc>,
    max_len: usize,
) -> Result<(Array2<i64>, Array2<i64>), SemanticError> {
    let seq_len = max_len.max(1);
    let batch = encoded.len();
    let mut id_storage = Vec::with_capacity(batch * seq_len);
    let mut mask_storage = Vec::with_capacity(batch * seq_len);

    for EncodedDoc { ids, mask } in encoded {
        if ids.len() != mask.len() {
            return Err(SemanticError::Inference(
                "tokenizer produced mismatched id/mask lengths".into(),
            ));
        }
        let pad = seq_len.saturating_sub(ids.len());
        id_storage.extend(ids);
        mask_storage.extend(mask);
        id_storage.extend(std::iter::repeat_n(0, pad));
        mask_storage.extend(std::iter::repeat_n(0, pad));
    }

    let input_ids = Array::from_shape_vec((batch, seq_len), id_storage)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    let attn_mask = Array::from_shape_vec((batch, seq_len), mask_storage)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    Ok((input_ids, attn_mask))
}

fn execute_text_session(
    session: &RefCell<Session<'static>>,
    input_ids: Array2<i64>,
    attn_mask: Array2<i64>,
) -> Result<Vec<Vec<f32>>, SemanticError> {
    let (batch, seq_len) = input_ids.dim();
    let mask_flat: Vec<i64> = attn_mask.iter().copied().collect();
    let mut guard = session.borrow_mut();
    let session_ref = &mut *guard;
    let mut runtime_inputs = Vec::with_capacity(session_ref.inputs.len());
    let mut input_ids_tensor = Some(input_ids);
    let mut attn_mask_tensor = Some(attn_mask);

    for input in &session_ref.inputs {
        match input.name.as_str() {
            "input_ids" => {
                let tensor = input_ids_tensor.take().ok_or_else(|| {
                    SemanticError::InvalidConfig(
                        "model requested `input_ids` multiple times".into(),
                    )
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "attention_mask" => {
                let tensor = attn_mask_tensor.take().ok_or_else(|| {
                    SemanticError::InvalidConfig(
                        "model requested `attention_mask` multiple times".into(),
                    )
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "token_type_ids" => {
                runtime_inputs.push(Array::from_elem((batch, seq_len), 0_i64).into_dyn());
            }
            other => {
                return Err(SemanticError::Inference(format!(
                    "unsupported model input '{other}'"
                )))
            }
        }
    }

    if runtime_inputs.is_empty() {
        return Err(SemanticError::Inference(
            "model did not declare any inputs".into(),
        ));
    }

    let outputs = session_ref
        .run::<i64, f32, _>(runtime_inputs)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    let output_tensor = outputs
        .into_iter()
        .next()
        .ok_or_else(|| SemanticError::Inference("model returned no outputs".into()))?;

    let shape = output_tensor.shape().to_vec();
    let flat: Vec<f32> = output_tensor.iter().copied().collect();
    match shape.as_slice() {
        // Already pooled: [batch, dim].
        [b, dim] if *b == batch => Ok(flat.chunks((*dim).max(1)).map(<[f32]>::to_vec).collect()),
        // Token embeddings: [batch, seq, dim].
        [b, seq, dim] if *b == batch && *seq == seq_len => {
            Ok(mean_pool(&flat, &mask_flat, batch, seq_len, *dim))
        }
        other => Err(SemanticError::Inference(format!(
            "unexpected model output shape {other:?} for batch {batch}"
        ))),
    }
}

/// Masked mean over the token axis of a row-major `[batch, seq, dim]` buffer.
/// Rows whose mask is all zero pool to the zero vector.
fn mean_pool(
    hidden: &[f32],
    mask: &[i64],
    batch: usize,
    seq_len: usize,
    dim: usize,
) -> Vec<Vec<f32>> {
    let mut pooled = Vec::with_capacity(batch);
    for b in 0..batch {
        let mut acc = vec![0.0f32; dim];
        let mut count = 0.0f32;
        for t in 0..seq_len {
            if mask[b * seq_len + t] == 0 {
                continue;
            }
            count += 1.0;
            let offset = (b * seq_len + t) * dim;
            for (a, &h) in acc.iter_mut().zip(&hidden[offset..offset + dim]) {
                *a += h;
            }
        }
        if count > 0.0 {
            for a in &mut acc {
                *a /= count;
            }
        }
        pooled.push(acc);
    }
    pooled
}
