use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::models::{RepositoryError, RepositoryResult, Restaurant};

/// Data access for restaurants and their menus
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// All restaurants, ordered by id
    async fn find_all(&self) -> RepositoryResult<Vec<Restaurant>>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Restaurant>>;

    /// Insert or replace. A restaurant or dish with a non-positive id gets a fresh one.
    async fn save(&self, restaurant: Restaurant) -> RepositoryResult<Restaurant>;

    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()>;

    async fn exists_by_id(&self, id: i64) -> RepositoryResult<bool>;

    /// Keep ids handed out from now on above the given ones. Read-only sources ignore this.
    async fn reserve_ids(&self, _max_restaurant_id: i64, _max_dish_id: i64) -> RepositoryResult<()> {
        Ok(())
    }

    /// Short name used in logs
    fn source_name(&self) -> &'static str;
}

#[derive(Debug)]
struct MemoryState {
    restaurants: BTreeMap<i64, Restaurant>,
    next_restaurant_id: i64,
    next_dish_id: i64,
}

impl MemoryState {
    fn assign_ids(&mut self, restaurant: &mut Restaurant) -> RepositoryResult<()> {
        let mut next_restaurant_id = self.next_restaurant_id;
        let mut next_dish_id = self.next_dish_id;

        if restaurant.id <= 0 {
            restaurant.id = next_restaurant_id;
        }
        next_restaurant_id = next_restaurant_id.max(id_after(restaurant.id)?);

        for dish in &mut restaurant.dishes {
            if dish.id <= 0 {
                dish.id = next_dish_id;
            }
            next_dish_id = next_dish_id.max(id_after(dish.id)?);
        }

        self.next_restaurant_id = next_restaurant_id;
        self.next_dish_id = next_dish_id;
        Ok(())
    }
}

fn id_after(id: i64) -> RepositoryResult<i64> {
    id.checked_add(1)
        .ok_or_else(|| RepositoryError::ConstraintViolation {
            message: format!("Id {} leaves no room for further ids", id),
        })
}

/// Writable in-process store. Dish ids are unique across all restaurants.
#[derive(Debug)]
pub struct InMemoryRestaurantRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRestaurantRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                restaurants: BTreeMap::new(),
                next_restaurant_id: 1,
                next_dish_id: 1,
            }),
        }
    }

    /// Load restaurants from a JSON array file, keeping ids present in the file
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn seed_from_file(&self, path: impl AsRef<Path> + Send) -> RepositoryResult<usize> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let restaurants: Vec<Restaurant> = serde_json::from_str(&content)?;
        self.seed(restaurants).await
    }

    pub async fn seed(&self, restaurants: Vec<Restaurant>) -> RepositoryResult<usize> {
        let count = restaurants.len();
        for restaurant in restaurants {
            self.save(restaurant).await?;
        }
        info!("Seeded {} restaurants into memory store", count);
        Ok(count)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.restaurants.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryRestaurantRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RestaurantRepository for InMemoryRestaurantRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<Restaurant>> {
        let state = self.state.read().await;
        Ok(state.restaurants.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Restaurant>> {
        let state = self.state.read().await;
        Ok(state.restaurants.get(&id).cloned())
    }

    #[instrument(skip(self, restaurant), fields(name = %restaurant.name))]
    async fn save(&self, mut restaurant: Restaurant) -> RepositoryResult<Restaurant> {
        let mut state = self.state.write().await;

        let mut seen = std::collections::HashSet::new();
        if let Some(dish) = restaurant
            .dishes
            .iter()
            .find(|dish| dish.id > 0 && !seen.insert(dish.id))
        {
            return Err(RepositoryError::ConstraintViolation {
                message: format!("Duplicate dish id {} in restaurant", dish.id),
            });
        }

        state.assign_ids(&mut restaurant)?;
        state.restaurants.insert(restaurant.id, restaurant.clone());

        debug!(restaurant_id = restaurant.id, "Restaurant saved");
        Ok(restaurant)
    }

    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        match state.restaurants.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn exists_by_id(&self, id: i64) -> RepositoryResult<bool> {
        let state = self.state.read().await;
        Ok(state.restaurants.contains_key(&id))
    }

    async fn reserve_ids(&self, max_restaurant_id: i64, max_dish_id: i64) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let next_restaurant_id = state.next_restaurant_id.max(id_after(max_restaurant_id)?);
        let next_dish_id = state.next_dish_id.max(id_after(max_dish_id)?);
        state.next_restaurant_id = next_restaurant_id;
        state.next_dish_id = next_dish_id;
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dish;
    use rust_decimal_macros::dec;

    fn unsaved(name: &str, dishes: &[&str]) -> Restaurant {
        Restaurant::new(
            0,
            name,
            dishes
                .iter()
                .map(|dish| Dish::new(0, *dish, dec!(7.50)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_save_assigns_ids() {
        let repo = InMemoryRestaurantRepository::new();

        let first = repo.save(unsaved("Chez Lulu", &["Gratin", "Crepe"])).await.unwrap();
        let second = repo.save(unsaved("Le Bistrot", &["Croque"])).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        let dish_ids: Vec<i64> = first
            .dishes
            .iter()
            .chain(second.dishes.iter())
            .map(|d| d.id)
            .collect();
        assert_eq!(dish_ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_explicit_ids_are_kept_and_counters_advance() {
        let repo = InMemoryRestaurantRepository::new();
        repo.save(Restaurant::new(10, "Seeded", vec![Dish::new(40, "Flan", dec!(3.00))]))
            .await
            .unwrap();

        let created = repo.save(unsaved("New", &["Tarte"])).await.unwrap();

        assert_eq!(created.id, 11);
        assert_eq!(created.dishes[0].id, 41);
    }

    #[tokio::test]
    async fn test_save_rejects_ids_at_the_top_of_the_range() {
        let repo = InMemoryRestaurantRepository::new();

        assert!(matches!(
            repo.save(Restaurant::new(i64::MAX, "R", vec![])).await,
            Err(RepositoryError::ConstraintViolation { .. })
        ));
        assert!(matches!(
            repo.save(Restaurant::new(5, "R", vec![Dish::new(i64::MAX, "D", dec!(1.00))]))
                .await,
            Err(RepositoryError::ConstraintViolation { .. })
        ));
        assert!(repo.is_empty().await);

        let created = repo.save(unsaved("New", &["Tarte"])).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.dishes[0].id, 1);
    }

    #[tokio::test]
    async fn test_reserve_ids_moves_counters_past_foreign_ids() {
        let repo = InMemoryRestaurantRepository::new();
        repo.save(unsaved("Chez Lulu", &["Gratin"])).await.unwrap();

        repo.reserve_ids(20, 70).await.unwrap();
        let created = repo.save(unsaved("New", &["Tarte"])).await.unwrap();
        assert_eq!(created.id, 21);
        assert_eq!(created.dishes[0].id, 71);

        // Lower reservations never move counters back
        repo.reserve_ids(3, 3).await.unwrap();
        let next = repo.save(unsaved("Next", &["Flan"])).await.unwrap();
        assert_eq!(next.id, 22);
        assert_eq!(next.dishes[0].id, 72);

        assert!(matches!(
            repo.reserve_ids(i64::MAX, 0).await,
            Err(RepositoryError::ConstraintViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_rejects_duplicate_dish_ids() {
        let repo = InMemoryRestaurantRepository::new();
        let restaurant = Restaurant::new(
            1,
            "Twins",
            vec![Dish::new(5, "A", dec!(1.00)), Dish::new(5, "B", dec!(2.00))],
        );

        assert!(matches!(
            repo.save(restaurant).await,
            Err(RepositoryError::ConstraintViolation { .. })
        ));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_find_and_delete() {
        let repo = InMemoryRestaurantRepository::new();
        let saved = repo.save(unsaved("Chez Lulu", &[])).await.unwrap();

        assert!(repo.exists_by_id(saved.id).await.unwrap());
        assert_eq!(repo.find_by_id(saved.id).await.unwrap(), Some(saved.clone()));

        repo.delete_by_id(saved.id).await.unwrap();

        assert!(repo.find_by_id(saved.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_by_id(saved.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_find_all_is_ordered_by_id() {
        let repo = InMemoryRestaurantRepository::new();
        repo.save(Restaurant::new(3, "C", vec![])).await.unwrap();
        repo.save(Restaurant::new(1, "A", vec![])).await.unwrap();

        let names: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_seed_from_missing_file() {
        let repo = InMemoryRestaurantRepository::new();

        assert!(matches!(
            repo.seed_from_file("does/not/exist.json").await,
            Err(RepositoryError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_seed_from_file() {
        let path = std::env::temp_dir().join(format!("speedliv-seed-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(
            &path,
            r#"[{"id": 1, "name": "Chez Lulu", "plats": [{"id": 1, "name": "Gratin", "price": 5.0}]}]"#,
        )
        .await
        .unwrap();

        let repo = InMemoryRestaurantRepository::new();
        let count = repo.seed_from_file(&path).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(count, 1);
        assert_eq!(repo.find_by_id(1).await.unwrap().unwrap().dishes.len(), 1);
    }
}
