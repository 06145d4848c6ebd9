#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageFormat, Rgb, RgbImage};
use index::files::write_pair;
use index::FlatIpIndex;
use store::{Photo, Restaurant, Review, SqliteStore, VibeMention};
use tempfile::TempDir;
use vibecheck::{
    boost_query, IndexConfig, Lexicon, MultiModalEncoder, SemanticConfig, StoreConfig,
    VibeCheckConfig,
};

pub const NEIGHBORHOODS: [&str; 4] = ["East Village", "Lower East Side", "SoHo", "West Village"];
pub const RAMEN_QUERY: &str = "cheap ramen in the east village";
pub const PLANTED_ID: i64 = 1_000;
pub const GHOST_QUERY: &str = "ghost kitchen delivery";
pub const GHOST_ID: i64 = 2_000;

/// On-disk index pair and SQLite database built with the stub encoders, plus
/// a config pointing at them.
pub struct Fixture {
    pub dir: TempDir,
    pub config: VibeCheckConfig,
}

impl Fixture {
    pub fn index_path(&self) -> PathBuf {
        self.config.index.index_path.clone()
    }

    pub fn ids_path(&self) -> PathBuf {
        self.config.index.ids_path.clone()
    }

    pub fn db_path(&self) -> PathBuf {
        self.config.store.path.clone()
    }
}

pub fn restaurant(id: i64) -> Restaurant {
    let neighborhood = NEIGHBORHOODS[id as usize % NEIGHBORHOODS.len()];
    let mut r = Restaurant::new(id, format!("Spot {id}"))
        .with_neighborhood(neighborhood)
        .with_rating(3.5 + (id % 15) as f64 / 10.0)
        .with_address(format!("{id} Avenue A, New York, NY 10009"))
        .with_vibes(vec![
            VibeMention::new("cozy", id % 7),
            VibeMention::new("lively", id % 5),
        ])
        .with_reviews(vec![Review::new(format!("review of {id}"), id % 11)])
        .with_photos(vec![
            Photo::new(Some(&format!("{id}_food_0.jpg")), None),
            Photo::new(Some(&format!("{id}_vibe_0.jpg")), None),
        ]);
    if id % 6 != 0 {
        r = r.with_price_level(id % 4 + 1);
    }
    r
}

fn boosted_vector(encoder: &MultiModalEncoder, query: &str) -> Vec<f32> {
    encoder
        .encode(&boost_query(query, &Lexicon::default()), None)
        .unwrap()
        .into_inner()
}

pub async fn fixture(count: i64) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let semantic = SemanticConfig::stub();
    let encoder = MultiModalEncoder::from_config(&semantic).await.unwrap();

    let db_path = dir.path().join("vibecheck.db");
    let db = SqliteStore::create(&db_path, 10).unwrap();

    let mut ids = Vec::new();
    let mut rows = Vec::new();
    for id in 1..=count {
        let r = restaurant(id);
        let text = format!("{} {}", r.name, r.neighborhood.as_deref().unwrap_or_default());
        rows.push(encoder.encode(&text, None).unwrap().into_inner());
        ids.push(id);
        db.insert(&r).unwrap();
    }

    let ippudo = Restaurant::new(PLANTED_ID, "Ippudo")
        .with_neighborhood("East Village")
        .with_price_level(2)
        .with_rating(4.6)
        .with_vibes(vec![VibeMention::new("lively", 40)]);
    db.insert(&ippudo).unwrap();
    rows.push(boosted_vector(&encoder, RAMEN_QUERY));
    ids.push(PLANTED_ID);

    // Indexed but never stored.
    rows.push(boosted_vector(&encoder, GHOST_QUERY));
    ids.push(GHOST_ID);
    drop(db);

    let flat = FlatIpIndex::from_rows(encoder.dimension(), &rows).unwrap();
    let index_path = dir.path().join("out").join("vibecheck_index.faiss");
    let ids_path = dir.path().join("out").join("meta_ids.npy");
    write_pair(&index_path, &ids_path, &flat, &ids).unwrap();

    let config = VibeCheckConfig {
        semantic,
        index: IndexConfig::new(index_path, ids_path),
        store: StoreConfig::new(db_path),
        ..VibeCheckConfig::default()
    };
    Fixture { dir, config }
}

pub fn png_bytes(seed: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(48, 32, |x, y| {
        Rgb([(x as u8).wrapping_mul(seed), (y as u8).wrapping_add(seed), 90])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}
