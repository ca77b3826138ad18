use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::config::CatalogConfig;
use crate::models::{CatalogError, Restaurant};

/// Message shown to the user whenever the catalog cannot be loaded
pub const CATALOG_UNAVAILABLE_MESSAGE: &str =
    "Unable to load restaurants. Check that the menu service is running.";

/// Source of the restaurant catalog
#[async_trait]
pub trait CatalogLoader: Send + Sync {
    /// Fetch every restaurant with its dishes
    async fn fetch_restaurants(&self) -> Result<Vec<Restaurant>, CatalogError>;
}

/// Catalog loader backed by the menu service's `GET /restaurants`
#[derive(Debug, Clone)]
pub struct HttpCatalogLoader {
    client: reqwest::Client,
    restaurants_url: String,
}

impl HttpCatalogLoader {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CatalogError::InvalidUrl {
                url: base_url.to_string(),
            });
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            restaurants_url: format!("{}/restaurants", base_url),
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Self::new(&config.catalog_base_url, config.catalog_timeout())
    }

    pub fn restaurants_url(&self) -> &str {
        &self.restaurants_url
    }
}

#[async_trait]
impl CatalogLoader for HttpCatalogLoader {
    #[instrument(skip(self), fields(url = %self.restaurants_url))]
    async fn fetch_restaurants(&self) -> Result<Vec<Restaurant>, CatalogError> {
        debug!("Requesting restaurant catalog");

        let response = self.client.get(&self.restaurants_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.restaurants_url.clone(),
            });
        }

        let restaurants: Vec<Restaurant> = response.json().await?;

        info!("Fetched {} restaurants", restaurants.len());
        Ok(restaurants)
    }
}

/// What the display layer knows about the catalog
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CatalogStatus {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<Restaurant>),
    Failed(String),
}

#[derive(Debug, Default)]
struct CatalogState {
    generation: u64,
    status: CatalogStatus,
}

/// Catalog state container fed by a [`CatalogLoader`].
///
/// Each reload bumps a generation counter; a fetch that completes after a
/// newer reload started is discarded.
pub struct Catalog {
    loader: Arc<dyn CatalogLoader>,
    state: Mutex<CatalogState>,
}

impl Catalog {
    pub fn new(loader: Arc<dyn CatalogLoader>) -> Self {
        Self {
            loader,
            state: Mutex::new(CatalogState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the catalog and record the outcome
    #[instrument(skip(self))]
    pub async fn reload(&self) -> CatalogStatus {
        let generation = {
            let mut state = self.lock();
            state.generation += 1;
            state.status = CatalogStatus::Loading;
            state.generation
        };

        let result = self.loader.fetch_restaurants().await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(generation, "Discarding superseded catalog result");
            return state.status.clone();
        }

        state.status = match result {
            Ok(restaurants) => {
                info!("Catalog loaded with {} restaurants", restaurants.len());
                CatalogStatus::Loaded(restaurants)
            }
            Err(e) => {
                error!(error = %e, "Error loading restaurants");
                CatalogStatus::Failed(CATALOG_UNAVAILABLE_MESSAGE.to_string())
            }
        };
        state.status.clone()
    }

    pub fn status(&self) -> CatalogStatus {
        self.lock().status.clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.lock().status, CatalogStatus::Loading)
    }

    /// User-facing error message, if the last load failed
    pub fn error(&self) -> Option<String> {
        match &self.lock().status {
            CatalogStatus::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Loaded restaurants; empty unless the last load succeeded
    pub fn restaurants(&self) -> Vec<Restaurant> {
        match &self.lock().status {
            CatalogStatus::Loaded(restaurants) => restaurants.clone(),
            _ => Vec::new(),
        }
    }

    pub fn find_restaurant(&self, restaurant_id: i64) -> Option<Restaurant> {
        match &self.lock().status {
            CatalogStatus::Loaded(restaurants) => restaurants
                .iter()
                .find(|restaurant| restaurant.id == restaurant_id)
                .cloned(),
            _ => None,
        }
    }
}
