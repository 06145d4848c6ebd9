use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use tracing::info;

use crate::types::TOP_VIBES_PER_RESTAURANT;
use crate::{
    Photo, Restaurant, RestaurantStore, Review, StoreError, VibeMention, VibeRestaurant,
    VibeSummary,
};

/// Tables read by [`SqliteStore`]. Used to create fixture databases.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS restaurants (
    id INTEGER PRIMARY KEY,
    name TEXT,
    rating REAL,
    address TEXT,
    reviews_count INTEGER,
    place_id TEXT,
    neighborhood TEXT,
    price_level INTEGER
);
CREATE TABLE IF NOT EXISTS vibe_photos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_id INTEGER NOT NULL,
    local_filename TEXT,
    photo_url TEXT
);
CREATE TABLE IF NOT EXISTS vibe_analysis (
    restaurant_id INTEGER NOT NULL,
    vibe_name TEXT NOT NULL,
    mention_count INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_id INTEGER NOT NULL,
    review_text TEXT,
    likes INTEGER
);
CREATE INDEX IF NOT EXISTS idx_vibe_photos_restaurant ON vibe_photos(restaurant_id);
CREATE INDEX IF NOT EXISTS idx_vibe_analysis_restaurant ON vibe_analysis(restaurant_id);
CREATE INDEX IF NOT EXISTS idx_reviews_restaurant ON reviews(restaurant_id);
";

const SELECT_RESTAURANT: &str = "
SELECT id, name, rating, address, reviews_count, place_id, neighborhood, price_level
FROM restaurants
WHERE id = ?1";

const SELECT_PHOTOS: &str = "
SELECT local_filename, photo_url
FROM vibe_photos
WHERE restaurant_id = ?1
ORDER BY
    CASE WHEN local_filename LIKE '%_vibe_%' THEN 0 ELSE 1 END,
    CASE WHEN photo_url IS NOT NULL THEN 0 ELSE 1 END,
    id";

const SELECT_VIBES: &str = "
SELECT vibe_name, mention_count
FROM vibe_analysis
WHERE restaurant_id = ?1
ORDER BY mention_count DESC, vibe_name
LIMIT ?2";

const SELECT_REVIEWS: &str = "
SELECT review_text, likes
FROM reviews
WHERE restaurant_id = ?1
ORDER BY likes DESC
LIMIT ?2";

const SELECT_TOP_VIBES: &str = "
SELECT vibe_name, SUM(mention_count) AS total
FROM vibe_analysis
GROUP BY vibe_name
ORDER BY total DESC, vibe_name
LIMIT ?1";

const SELECT_VIBE_RESTAURANTS: &str = "
SELECT r.id, r.name, r.rating, va.mention_count
FROM vibe_analysis va
JOIN restaurants r ON va.restaurant_id = r.id
WHERE va.vibe_name = ?1
ORDER BY va.mention_count DESC, r.rating DESC
LIMIT ?2";

/// Restaurant records in the SQLite database produced by the data pipeline.
///
/// `rusqlite::Connection` is not `Sync`; lookups are serialized on a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    review_limit: usize,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("review_limit", &self.review_limit)
            .finish()
    }
}

impl SqliteStore {
    /// Opens an existing database read-only. Used when serving.
    pub fn open_readonly(path: &Path, review_limit: usize) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::MissingDatabase(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let store = Self::from_connection(conn, review_limit);
        info!(path = %path.display(), restaurants = store.count()?, "restaurant store opened");
        Ok(store)
    }

    /// Opens (creating if needed) a writable database with [`SCHEMA`] applied.
    pub fn create(path: &Path, review_limit: usize) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self::from_connection(conn, review_limit))
    }

    pub fn in_memory(review_limit: usize) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self::from_connection(conn, review_limit))
    }

    fn from_connection(conn: Connection, review_limit: usize) -> Self {
        Self {
            conn: Mutex::new(conn),
            review_limit,
        }
    }

    /// Writes a restaurant with its photos, vibes and reviews.
    pub fn insert(&self, restaurant: &Restaurant) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO restaurants
                 (id, name, rating, address, reviews_count, place_id, neighborhood, price_level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                restaurant.id,
                restaurant.name,
                restaurant.rating,
                restaurant.address,
                restaurant.reviews_count,
                restaurant.place_id,
                restaurant.neighborhood,
                restaurant.price_level,
            ],
        )?;
        for photo in &restaurant.photos {
            tx.execute(
                "INSERT INTO vibe_photos (restaurant_id, local_filename, photo_url) VALUES (?1, ?2, ?3)",
                params![restaurant.id, photo.filename, photo.url],
            )?;
        }
        for vibe in &restaurant.vibes {
            tx.execute(
                "INSERT INTO vibe_analysis (restaurant_id, vibe_name, mention_count) VALUES (?1, ?2, ?3)",
                params![restaurant.id, vibe.name, vibe.count],
            )?;
        }
        for review in &restaurant.reviews {
            tx.execute(
                "INSERT INTO reviews (restaurant_id, review_text, likes) VALUES (?1, ?2, ?3)",
                params![restaurant.id, review.text, review.likes],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn row_to_restaurant(row: &Row<'_>) -> rusqlite::Result<Restaurant> {
    Ok(Restaurant {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        rating: row.get(2)?,
        address: row.get(3)?,
        reviews_count: row.get(4)?,
        place_id: row.get(5)?,
        neighborhood: row.get(6)?,
        price_level: row.get(7)?,
        photos: Vec::new(),
        image_filename: None,
        photo_filename: None,
        photo_url: None,
        vibes: Vec::new(),
        reviews: Vec::new(),
    })
}

fn sql_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl RestaurantStore for SqliteStore {
    fn get(&self, id: i64) -> Result<Option<Restaurant>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let Some(mut restaurant) = conn
            .query_row(SELECT_RESTAURANT, [id], row_to_restaurant)
            .optional()?
        else {
            return Ok(None);
        };

        let photos = conn
            .prepare_cached(SELECT_PHOTOS)?
            .query_map([id], |row| {
                Ok(Photo {
                    filename: row.get(0)?,
                    url: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        restaurant.set_photos(photos);

        restaurant.vibes = conn
            .prepare_cached(SELECT_VIBES)?
            .query_map(params![id, sql_limit(TOP_VIBES_PER_RESTAURANT)], |row| {
                Ok(VibeMention {
                    name: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        restaurant.reviews = conn
            .prepare_cached(SELECT_REVIEWS)?
            .query_map(params![id, sql_limit(self.review_limit)], |row| {
                Ok(Review {
                    text: row.get(0)?,
                    likes: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(restaurant))
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM restaurants", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }

    fn top_vibes(&self, limit: usize, per_vibe: usize) -> Result<Vec<VibeSummary>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let totals = conn
            .prepare_cached(SELECT_TOP_VIBES)?
            .query_map([sql_limit(limit)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare_cached(SELECT_VIBE_RESTAURANTS)?;
        let mut summaries = Vec::with_capacity(totals.len());
        for (name, count) in totals {
            let restaurants = stmt
                .query_map(params![name, sql_limit(per_vibe)], |row| {
                    Ok(VibeRestaurant {
                        id: row.get(0)?,
                        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        rating: row.get(2)?,
                        mention_count: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            summaries.push(VibeSummary {
                name,
                count,
                restaurants,
            });
        }
        Ok(summaries)
    }
}
