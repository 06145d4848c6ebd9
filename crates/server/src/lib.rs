//! VibeCheck Server - HTTP API for multi-modal restaurant search
//!
//! Loads the search pipeline once at startup (text and image encoders, the
//! vector index, the restaurant store) and serves it over HTTP. Searches run
//! on the blocking pool, with concurrent inference capped by configuration.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /api/search` - JSON, multipart (with an `image` upload) or urlencoded search
//! - `GET /api/restaurant/{id}` - Restaurant detail
//! - `GET /api/vibe-stats`, `GET /api/top-vibes` - Most-mentioned vibes
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe with index and encoder details
//!
//! Errors use one shape: `{"error": {"code": "...", "message": "..."}}`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
