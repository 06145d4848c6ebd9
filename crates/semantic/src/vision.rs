//! CLIP-style image preprocessing.

use image::imageops::{self, FilterType};
use image::RgbImage;
use onnxruntime::ndarray::Array4;

use crate::{ImageDecodeError, ImageModelConfig};

/// Decodes an uploaded payload (PNG, JPEG or WebP) into an RGB raster.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, ImageDecodeError> {
    if bytes.is_empty() {
        return Err(ImageDecodeError::Empty);
    }
    let img = image::load_from_memory(bytes).map_err(|e| ImageDecodeError::Format(e.to_string()))?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(ImageDecodeError::ZeroArea { width, height });
    }
    Ok(img.to_rgb8())
}

/// Resize, center-crop and normalize an image into the `[1, 3, size, size]`
/// tensor expected by the vision tower.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPreprocess {
    size: u32,
    mean: [f32; 3],
    std: [f32; 3],
}

impl ClipPreprocess {
    pub fn new(size: u32, mean: [f32; 3], std: [f32; 3]) -> Self {
        Self { size, mean, std }
    }

    pub fn from_config(cfg: &ImageModelConfig) -> Self {
        Self::new(cfg.input_size, cfg.mean, cfg.std)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn prepare(&self, bytes: &[u8]) -> Result<Array4<f32>, ImageDecodeError> {
        let rgb = decode_rgb(bytes)?;
        Ok(self.tensor(&self.resize_and_crop(&rgb)))
    }

    /// Bicubic resize so the shorter side equals `size`, then a centered square crop.
    pub fn resize_and_crop(&self, img: &RgbImage) -> RgbImage {
        let (w, h) = img.dimensions();
        let size = self.size;
        let (nw, nh) = if w <= h {
            (size, scaled_side(h, size, w))
        } else {
            (scaled_side(w, size, h), size)
        };
        let resized = imageops::resize(img, nw, nh, FilterType::CatmullRom);
        let left = (nw - size) / 2;
        let top = (nh - size) / 2;
        imageops::crop_imm(&resized, left, top, size, size).to_image()
    }

    /// NCHW tensor with pixels scaled to [0, 1] and normalized per channel.
    pub fn tensor(&self, img: &RgbImage) -> Array4<f32> {
        let (w, h) = img.dimensions();
        Array4::from_shape_fn((1, 3, h as usize, w as usize), |(_, c, y, x)| {
            let value = img.get_pixel(x as u32, y as u32).0[c] as f32 / 255.0;
            (value - self.mean[c]) / self.std[c]
        })
    }
}

/// `long * target / short`, rounded, never below `target`.
fn scaled_side(long: u32, target: u32, short: u32) -> u32 {
    let scaled = (long as f64 * target as f64 / short as f64).round() as u32;
    scaled.max(target)
}
