use serde::{Deserialize, Serialize};

/// A restaurant with everything the search results and detail view show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub rating: Option<f64>,
    pub address: Option<String>,
    pub reviews_count: Option<i64>,
    pub place_id: Option<String>,
    /// Canonical neighborhood label, compared exactly when filtering.
    pub neighborhood: Option<String>,
    /// 1 (`$`) through 4 (`$$$$`).
    pub price_level: Option<i64>,
    /// Atmosphere shots first, then photos with a remote URL.
    #[serde(default)]
    pub photos: Vec<Photo>,
    pub image_filename: Option<String>,
    pub photo_filename: Option<String>,
    pub photo_url: Option<String>,
    /// Most-mentioned vibes, at most three.
    #[serde(default)]
    pub vibes: Vec<VibeMention>,
    /// Most-liked reviews first.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Restaurant {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rating: None,
            address: None,
            reviews_count: None,
            place_id: None,
            neighborhood: None,
            price_level: None,
            photos: Vec::new(),
            image_filename: None,
            photo_filename: None,
            photo_url: None,
            vibes: Vec::new(),
            reviews: Vec::new(),
        }
    }

    pub fn with_neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = Some(neighborhood.into());
        self
    }

    pub fn with_price_level(mut self, price_level: i64) -> Self {
        self.price_level = Some(price_level);
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Orders `photos` for display and mirrors the lead photo into the
    /// `image_filename`/`photo_filename`/`photo_url` fields.
    pub fn with_photos(mut self, mut photos: Vec<Photo>) -> Self {
        order_photos(&mut photos);
        self.set_photos(photos);
        self
    }

    pub fn with_vibes(mut self, mut vibes: Vec<VibeMention>) -> Self {
        vibes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        vibes.truncate(TOP_VIBES_PER_RESTAURANT);
        self.vibes = vibes;
        self
    }

    pub fn with_reviews(mut self, mut reviews: Vec<Review>) -> Self {
        reviews.sort_by(|a, b| b.likes.unwrap_or(0).cmp(&a.likes.unwrap_or(0)));
        self.reviews = reviews;
        self
    }

    /// Photos are stored in display order.
    pub(crate) fn set_photos(&mut self, photos: Vec<Photo>) {
        let lead = photos.first();
        self.image_filename = lead.and_then(|p| p.filename.clone());
        self.photo_filename = self.image_filename.clone();
        self.photo_url = lead.and_then(|p| p.url.clone());
        self.photos = photos;
    }
}

pub(crate) const TOP_VIBES_PER_RESTAURANT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub filename: Option<String>,
    pub url: Option<String>,
}

impl Photo {
    pub fn new(filename: Option<&str>, url: Option<&str>) -> Self {
        Self {
            filename: filename.map(str::to_string),
            url: url.map(str::to_string),
        }
    }

    /// Mirrors SQL `LIKE '%_vibe_%'`: "vibe" with at least one character on each side.
    pub fn is_vibe_shot(&self) -> bool {
        self.filename.as_deref().is_some_and(|name| {
            let lower = name.to_ascii_lowercase();
            lower
                .match_indices("vibe")
                .any(|(i, _)| i >= 1 && i + 4 < lower.len())
        })
    }
}

/// Vibe shots first, then photos with a URL, otherwise stable.
pub fn order_photos(photos: &mut [Photo]) {
    photos.sort_by_key(|p| (!p.is_vibe_shot(), p.url.is_none()));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibeMention {
    pub name: String,
    pub count: i64,
}

impl VibeMention {
    pub fn new(name: impl Into<String>, count: i64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub text: Option<String>,
    pub likes: Option<i64>,
}

impl Review {
    pub fn new(text: impl Into<String>, likes: i64) -> Self {
        Self {
            text: Some(text.into()),
            likes: Some(likes),
        }
    }
}

/// A vibe with its total mentions and the restaurants mentioning it most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibeSummary {
    pub name: String,
    pub count: i64,
    pub restaurants: Vec<VibeRestaurant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibeRestaurant {
    pub id: i64,
    pub name: String,
    pub rating: Option<f64>,
    pub mention_count: i64,
}
