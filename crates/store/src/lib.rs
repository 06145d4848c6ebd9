//! Restaurant records for VibeCheck search results.
//!
//! The vector index only knows restaurant ids. A [`RestaurantStore`] turns an
//! id into a full [`Restaurant`]: core fields, photos ordered for display,
//! the three most-mentioned vibes and the most-liked reviews. It also
//! aggregates vibe statistics across the catalogue.
//!
//! Two backends are provided: [`SqliteStore`] reads the database produced by
//! the data pipeline, [`InMemoryStore`] holds records in a map for tests and
//! small deployments.
//!
//! ```
//! use store::{InMemoryStore, Restaurant, RestaurantStore};
//!
//! let store = InMemoryStore::new();
//! store.insert(Restaurant::new(7, "Lucali").with_neighborhood("Carroll Gardens")).unwrap();
//! let found = store.get(7).unwrap().unwrap();
//! assert_eq!(found.neighborhood.as_deref(), Some("Carroll Gardens"));
//! assert!(store.get(8).unwrap().is_none());
//! ```

mod config;
mod error;
mod memory;
mod sqlite;
mod types;

use std::path::Path;
use std::sync::Arc;

pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::InMemoryStore;
pub use sqlite::{SqliteStore, SCHEMA};
pub use types::{order_photos, Photo, Restaurant, Review, VibeMention, VibeRestaurant, VibeSummary};

/// Read access to restaurant records.
pub trait RestaurantStore: Send + Sync {
    /// `Ok(None)` when no restaurant has this id.
    fn get(&self, id: i64) -> Result<Option<Restaurant>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;

    /// The `limit` vibes with the most total mentions, each with its top
    /// `per_vibe` restaurants.
    fn top_vibes(&self, limit: usize, per_vibe: usize) -> Result<Vec<VibeSummary>, StoreError>;
}

/// Opens the SQLite database named by `cfg` read-only.
pub fn open_store(cfg: &StoreConfig) -> Result<Arc<dyn RestaurantStore>, StoreError> {
    cfg.validate()?;
    let store = SqliteStore::open_readonly(Path::new(&cfg.path), cfg.review_limit)?;
    Ok(Arc::new(store))
}
