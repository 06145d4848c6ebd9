use ndarray::{aview1, ArrayView2, Axis};
use serde::Serialize;

/// Fused query embedding: `[text ‖ image]`.
///
/// Each segment is unit-norm on its own, or all zeros when that modality is
/// absent. The concatenation is not re-normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryVector {
    values: Vec<f32>,
    text_dim: usize,
    has_image: bool,
}

impl QueryVector {
    pub(crate) fn from_segments(mut text: Vec<f32>, image: Vec<f32>, has_image: bool) -> Self {
        let text_dim = text.len();
        text.extend(image);
        Self {
            values: text,
            text_dim,
            has_image,
        }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn text_dim(&self) -> usize {
        self.text_dim
    }

    pub fn image_dim(&self) -> usize {
        self.values.len() - self.text_dim
    }

    pub fn text_segment(&self) -> &[f32] {
        &self.values[..self.text_dim]
    }

    pub fn image_segment(&self) -> &[f32] {
        &self.values[self.text_dim..]
    }

    /// Whether the image segment carries an embedding (as opposed to zeros).
    pub fn has_image(&self) -> bool {
        self.has_image
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Single-row matrix view (batch of one) for matrix-oriented search APIs.
    pub fn as_matrix(&self) -> ArrayView2<'_, f32> {
        aview1(&self.values).insert_axis(Axis(0))
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.values
    }
}
