//! VibeCheck query encoding
//!
//! Turns a search query into the 896-wide vector the restaurant index was built
//! with: a sentence embedding of the (boosted) query text followed by a CLIP
//! image embedding of an optional upload.
//!
//! - **Text** runs an ONNX sentence encoder (all-MiniLM-L6-v2 by default, 384 dims)
//!   with mean pooling over the attention mask.
//! - **Image** decodes PNG/JPEG/WebP, applies CLIP preprocessing and runs the
//!   ONNX vision tower (512 dims).
//! - **Stub mode** (`mode: "fast"`) swaps either model for a hash-seeded
//!   generator so the pipeline runs without weights.
//!
//! Each segment is L2-normalized on its own. A missing image, or one that
//! fails to decode or embed, leaves its segment at zero and the query runs
//! text-only.
//!
//! ## Threading notes
//!
//! ONNX sessions are cached per thread, keyed by the model files. The loaders
//! warm the session on the calling thread; other threads load lazily on first use.
//!
//! ## Quick example
//!
//! ```
//! use semantic::{MultiModalEncoder, SemanticConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), semantic::SemanticError> {
//! let encoder = MultiModalEncoder::from_config(&SemanticConfig::stub()).await?;
//! let query = encoder.encode("cozy ramen date night", None)?;
//! assert_eq!(query.dimension(), 896);
//! assert!(query.image_segment().iter().all(|&x| x == 0.0));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod types;
pub mod vision;

mod assets;
mod cache;
mod embedder;
mod encoder;
mod normalize;
mod onnx;
mod stub;

pub use crate::config::{ImageModelConfig, SemanticConfig, TextModelConfig};
pub use crate::embedder::{
    load_image_embedder, load_text_embedder, ImageEmbedder, OnnxImageEmbedder, OnnxTextEmbedder,
    TextEmbedder,
};
pub use crate::encoder::MultiModalEncoder;
pub use crate::error::{ImageDecodeError, SemanticError};
pub use crate::stub::{StubImageEmbedder, StubTextEmbedder};
pub use crate::types::QueryVector;
pub use crate::vision::ClipPreprocess;
