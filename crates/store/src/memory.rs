use std::collections::HashMap;
use std::sync::RwLock;

use crate::{Restaurant, RestaurantStore, StoreError, VibeRestaurant, VibeSummary};

/// An in-memory store using a `RwLock` around a `HashMap`. Vibe statistics
/// aggregate the vibes attached to each record.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<i64, Restaurant>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, restaurant: Restaurant) -> Result<(), StoreError> {
        let mut guard = self.records.write().map_err(|_| StoreError::Poisoned)?;
        guard.insert(restaurant.id, restaurant);
        Ok(())
    }

    pub fn remove(&self, id: i64) -> Result<Option<Restaurant>, StoreError> {
        let mut guard = self.records.write().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.remove(&id))
    }
}

impl FromIterator<Restaurant> for InMemoryStore {
    fn from_iter<T: IntoIterator<Item = Restaurant>>(iter: T) -> Self {
        Self {
            records: RwLock::new(iter.into_iter().map(|r| (r.id, r)).collect()),
        }
    }
}

impl RestaurantStore for InMemoryStore {
    fn get(&self, id: i64) -> Result<Option<Restaurant>, StoreError> {
        let guard = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    fn count(&self) -> Result<usize, StoreError> {
        let guard = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.len())
    }

    fn top_vibes(&self, limit: usize, per_vibe: usize) -> Result<Vec<VibeSummary>, StoreError> {
        let guard = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let mut by_vibe: HashMap<&str, Vec<VibeRestaurant>> = HashMap::new();
        for restaurant in guard.values() {
            for vibe in &restaurant.vibes {
                by_vibe.entry(vibe.name.as_str()).or_default().push(VibeRestaurant {
                    id: restaurant.id,
                    name: restaurant.name.clone(),
                    rating: restaurant.rating,
                    mention_count: vibe.count,
                });
            }
        }

        let mut summaries: Vec<VibeSummary> = by_vibe
            .into_iter()
            .map(|(name, mut restaurants)| {
                let count = restaurants.iter().map(|r| r.mention_count).sum();
                restaurants.sort_by(|a, b| {
                    b.mention_count
                        .cmp(&a.mention_count)
                        .then_with(|| b.rating.unwrap_or(f64::MIN).total_cmp(&a.rating.unwrap_or(f64::MIN)))
                        .then_with(|| a.id.cmp(&b.id))
                });
                restaurants.truncate(per_vibe);
                VibeSummary {
                    name: name.to_string(),
                    count,
                    restaurants,
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        summaries.truncate(limit);
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VibeMention;

    fn store() -> InMemoryStore {
        [
            Restaurant::new(1, "Ippudo")
                .with_rating(4.5)
                .with_vibes(vec![VibeMention::new("cozy", 4), VibeMention::new("loud", 1)]),
            Restaurant::new(2, "Ramen Lab")
                .with_rating(4.7)
                .with_vibes(vec![VibeMention::new("cozy", 4)]),
            Restaurant::new(3, "Le Bain")
                .with_rating(3.9)
                .with_vibes(vec![VibeMention::new("loud", 9)]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn get_and_missing() {
        let store = store();
        assert_eq!(store.get(2).unwrap().unwrap().name, "Ramen Lab");
        assert!(store.get(99).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn insert_and_remove() {
        let store = InMemoryStore::new();
        store.insert(Restaurant::new(5, "Katz's")).unwrap();
        assert!(store.get(5).unwrap().is_some());
        assert!(store.remove(5).unwrap().is_some());
        assert!(store.get(5).unwrap().is_none());
    }

    #[test]
    fn top_vibes_ranked_by_total_then_restaurants_by_mentions_and_rating() {
        let vibes = store().top_vibes(20, 5).unwrap();
        assert_eq!(vibes.len(), 2);
        assert_eq!(vibes[0].name, "loud");
        assert_eq!(vibes[0].count, 10);
        assert_eq!(vibes[1].name, "cozy");
        let ids: Vec<i64> = vibes[1].restaurants.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let limited = store().top_vibes(1, 1).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].restaurants.len(), 1);
    }
}
