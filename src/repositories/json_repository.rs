use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::models::{RepositoryError, RepositoryResult, Restaurant};
use crate::repositories::RestaurantRepository;

/// Read-only restaurant list loaded once from a JSON file
#[derive(Debug, Clone)]
pub struct JsonRestaurantRepository {
    path: PathBuf,
    restaurants: Vec<Restaurant>,
}

impl JsonRestaurantRepository {
    pub fn from_restaurants(path: impl Into<PathBuf>, restaurants: Vec<Restaurant>) -> Self {
        Self {
            path: path.into(),
            restaurants,
        }
    }

    /// Parse the file, surfacing any I/O or JSON error
    pub async fn try_load(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let restaurants: Vec<Restaurant> = serde_json::from_str(&content)?;

        info!(
            path = %path.display(),
            "Loaded {} restaurants from JSON file",
            restaurants.len()
        );
        Ok(Self::from_restaurants(path, restaurants))
    }

    /// Like [`try_load`](Self::try_load), but an unreadable file yields an empty list
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path).await {
            Ok(repository) => repository,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error reading restaurants JSON file");
                Self::from_restaurants(path, Vec::new())
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_only(&self) -> RepositoryError {
        RepositoryError::ReadOnly {
            source_name: self.path.display().to_string(),
        }
    }
}

#[async_trait]
impl RestaurantRepository for JsonRestaurantRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<Restaurant>> {
        Ok(self.restaurants.clone())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Restaurant>> {
        Ok(self.restaurants.iter().find(|r| r.id == id).cloned())
    }

    async fn save(&self, _restaurant: Restaurant) -> RepositoryResult<Restaurant> {
        Err(self.read_only())
    }

    async fn delete_by_id(&self, _id: i64) -> RepositoryResult<()> {
        Err(self.read_only())
    }

    async fn exists_by_id(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.restaurants.iter().any(|r| r.id == id))
    }

    fn source_name(&self) -> &'static str {
        "json"
    }
}
