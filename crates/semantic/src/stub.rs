use fxhash::hash64;

use crate::embedder::{ImageEmbedder, TextEmbedder};
use crate::vision::decode_rgb;
use crate::SemanticError;

/// Hash-seeded pseudo-random vector in `[-1, 1)`. Same input, same vector.
fn seeded_vector(seed: u64, dimension: usize) -> Vec<f32> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..dimension).map(|_| rng.f32() * 2.0 - 1.0).collect()
}

/// Deterministic stand-in for the sentence encoder, used in `"fast"` mode and
/// when model assets are unavailable with `fallback_to_stub` set.
#[derive(Debug, Clone)]
pub struct StubTextEmbedder {
    dimension: usize,
}

impl StubTextEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl TextEmbedder for StubTextEmbedder {
    fn name(&self) -> &str {
        "stub-text"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        Ok(seeded_vector(hash64(text.as_bytes()), self.dimension))
    }
}

/// Deterministic stand-in for the vision encoder. Payloads are still decoded,
/// so corrupt uploads fail exactly like they would against the real model.
#[derive(Debug, Clone)]
pub struct StubImageEmbedder {
    dimension: usize,
}

impl StubImageEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl ImageEmbedder for StubImageEmbedder {
    fn name(&self) -> &str {
        "stub-image"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, bytes: &[u8]) -> Result<Vec<f32>, SemanticError> {
        let rgb = decode_rgb(bytes)?;
        Ok(seeded_vector(hash64(rgb.as_raw()), self.dimension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageDecodeError;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn text_stub_is_deterministic() {
        let stub = StubTextEmbedder::new(384);
        let a = stub.embed("cozy date night").unwrap();
        let b = stub.embed("cozy date night").unwrap();
        assert_eq!(a.len(), 384);
        assert_eq!(a, b);
    }

    #[test]
    fn text_stub_differs_per_text() {
        let stub = StubTextEmbedder::new(32);
        assert_ne!(stub.embed("ramen").unwrap(), stub.embed("pizza").unwrap());
    }

    #[test]
    fn text_stub_handles_empty_text() {
        let v = StubTextEmbedder::new(16).embed("").unwrap();
        assert_eq!(v.len(), 16);
        assert!(v.iter().any(|&x| x != 0.0));
        assert!(v.iter().all(|x| (-1.0..1.0).contains(x)));
    }

    #[test]
    fn image_stub_decodes_payload() {
        let stub = StubImageEmbedder::new(512);
        let err = stub.embed(b"\x89PNG broken").unwrap_err();
        assert!(matches!(
            err,
            SemanticError::ImageDecode(ImageDecodeError::Format(_))
        ));
        assert!(matches!(
            stub.embed(&[]),
            Err(SemanticError::ImageDecode(ImageDecodeError::Empty))
        ));
    }

    #[test]
    fn image_stub_depends_on_pixels() {
        let encode = |color: [u8; 3]| {
            let mut out = Cursor::new(Vec::new());
            RgbImage::from_pixel(2, 2, Rgb(color))
                .write_to(&mut out, ImageFormat::Png)
                .unwrap();
            out.into_inner()
        };
        let stub = StubImageEmbedder::new(8);
        let red = stub.embed(&encode([255, 0, 0])).unwrap();
        assert_eq!(red, stub.embed(&encode([255, 0, 0])).unwrap());
        assert_ne!(red, stub.embed(&encode([0, 0, 255])).unwrap());
    }
}
