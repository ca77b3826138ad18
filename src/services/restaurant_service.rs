use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    CreateRestaurantRequest, DataSourceStrategy, RepositoryError, Restaurant, ServiceError,
    ServiceResult, Validate,
};
use crate::observability::{Metrics, RestaurantTracingMiddleware};
use crate::repositories::RestaurantRepository;

/// Restaurant catalog backed by a memory store and a read-only JSON source
pub struct RestaurantService {
    strategy: DataSourceStrategy,
    memory: Arc<dyn RestaurantRepository>,
    json: Arc<dyn RestaurantRepository>,
    tracer: Option<RestaurantTracingMiddleware>,
}

impl RestaurantService {
    pub fn new(
        strategy: DataSourceStrategy,
        memory: Arc<dyn RestaurantRepository>,
        json: Arc<dyn RestaurantRepository>,
    ) -> Self {
        Self {
            strategy,
            memory,
            json,
            tracer: None,
        }
    }

    /// Count every operation in `restaurant_operations_total`
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.tracer = Some(RestaurantTracingMiddleware::new(metrics));
        self
    }

    pub fn strategy(&self) -> DataSourceStrategy {
        self.strategy
    }

    /// Log a repository failure with the source it came from
    fn source_error(repository: &dyn RestaurantRepository, error: RepositoryError) -> ServiceError {
        crate::warn_with_trace!(
            source = repository.source_name(),
            error = %error,
            "Restaurant source failed"
        );
        error.into()
    }

    /// Keep memory-generated ids clear of the ones the JSON source already uses
    async fn reserve_json_ids(&self) -> ServiceResult<()> {
        let restaurants = self
            .json
            .find_all()
            .await
            .map_err(|e| Self::source_error(self.json.as_ref(), e))?;

        let max_restaurant_id = restaurants.iter().map(|r| r.id).max().unwrap_or(0);
        let max_dish_id = restaurants
            .iter()
            .flat_map(|r| r.dishes.iter().map(|d| d.id))
            .max()
            .unwrap_or(0);

        self.memory
            .reserve_ids(max_restaurant_id, max_dish_id)
            .await
            .map_err(|e| Self::source_error(self.memory.as_ref(), e))
    }

    async fn traced<T, F>(&self, operation: &str, future: F) -> ServiceResult<T>
    where
        F: Future<Output = ServiceResult<T>>,
    {
        match &self.tracer {
            Some(tracer) => tracer.trace_restaurant_operation(operation, future).await,
            None => future.await,
        }
    }

    #[instrument(skip(self), fields(strategy = %self.strategy))]
    pub async fn list_restaurants(&self) -> ServiceResult<Vec<Restaurant>> {
        self.traced("list", async {
            let mut restaurants = Vec::new();
            if self.strategy.uses_memory() {
                let found = self
                    .memory
                    .find_all()
                    .await
                    .map_err(|e| Self::source_error(self.memory.as_ref(), e))?;
                restaurants.extend(found);
            }
            if self.strategy.uses_json() {
                let found = self
                    .json
                    .find_all()
                    .await
                    .map_err(|e| Self::source_error(self.json.as_ref(), e))?;
                restaurants.extend(found);
            }

            crate::info_with_trace!("Found {} restaurants", restaurants.len());
            Ok(restaurants)
        })
        .await
    }

    #[instrument(skip(self), fields(strategy = %self.strategy))]
    pub async fn get_restaurant(&self, id: i64) -> ServiceResult<Restaurant> {
        self.traced("get", async {
            if self.strategy.uses_memory() {
                let found = self
                    .memory
                    .find_by_id(id)
                    .await
                    .map_err(|e| Self::source_error(self.memory.as_ref(), e))?;
                if let Some(restaurant) = found {
                    return Ok(restaurant);
                }
            }
            if self.strategy.uses_json() {
                let found = self
                    .json
                    .find_by_id(id)
                    .await
                    .map_err(|e| Self::source_error(self.json.as_ref(), e))?;
                if let Some(restaurant) = found {
                    return Ok(restaurant);
                }
            }

            crate::warn_with_trace!("Restaurant not found");
            Err(ServiceError::RestaurantNotFound { id })
        })
        .await
    }

    #[instrument(skip(self, request), fields(name = %request.name, dishes = request.dishes.len()))]
    pub async fn create_restaurant(
        &self,
        request: CreateRestaurantRequest,
    ) -> ServiceResult<Restaurant> {
        self.traced("create", async {
            request.validate()?;
            if self.strategy.uses_json() {
                self.reserve_json_ids().await?;
            }

            let created = self
                .memory
                .save(Restaurant::from(request))
                .await
                .map_err(|e| Self::source_error(self.memory.as_ref(), e))?;

            crate::info_with_trace!(restaurant_id = created.id, "Restaurant created");
            Ok(created)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_restaurant(&self, id: i64) -> ServiceResult<()> {
        self.traced("delete", async {
            match self.memory.delete_by_id(id).await {
                Ok(()) => {
                    crate::info_with_trace!("Restaurant deleted");
                    Ok(())
                }
                Err(RepositoryError::NotFound) => Err(ServiceError::RestaurantNotFound { id }),
                Err(e) => Err(Self::source_error(self.memory.as_ref(), e)),
            }
        })
        .await
    }
}
