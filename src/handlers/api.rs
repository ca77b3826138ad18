use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::models::{CreateRestaurantRequest, Restaurant, ServiceError};
use crate::services::RestaurantService;

type ApiError = (StatusCode, Json<Value>);

/// Shared state for the restaurant endpoints
#[derive(Clone)]
pub struct ApiState {
    pub restaurant_service: Arc<RestaurantService>,
}

pub fn create_api_router(restaurant_service: Arc<RestaurantService>) -> Router {
    let state = ApiState { restaurant_service };

    Router::new()
        .route("/restaurants", get(list_restaurants).post(create_restaurant))
        .route(
            "/restaurants/:restaurant_id",
            get(get_restaurant).delete(delete_restaurant),
        )
        .with_state(state)
}

#[instrument(name = "list_restaurants", skip(state))]
pub async fn list_restaurants(
    State(state): State<ApiState>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    match state.restaurant_service.list_restaurants().await {
        Ok(restaurants) => {
            info!("Returning {} restaurants", restaurants.len());
            Ok(Json(restaurants))
        }
        Err(err) => {
            error!("Failed to list restaurants: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "get_restaurant", skip(state), fields(restaurant_id = %restaurant_id))]
pub async fn get_restaurant(
    State(state): State<ApiState>,
    Path(restaurant_id): Path<i64>,
) -> Result<Json<Restaurant>, ApiError> {
    state
        .restaurant_service
        .get_restaurant(restaurant_id)
        .await
        .map(Json)
        .map_err(|err| {
            warn!("Failed to get restaurant {}: {}", restaurant_id, err);
            service_error_to_response(err)
        })
}

#[instrument(name = "create_restaurant", skip(state, request), fields(name = %request.name))]
pub async fn create_restaurant(
    State(state): State<ApiState>,
    Json(request): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<Restaurant>), ApiError> {
    match state.restaurant_service.create_restaurant(request).await {
        Ok(restaurant) => {
            crate::info_with_trace!(restaurant_id = restaurant.id, "Restaurant created");
            Ok((StatusCode::CREATED, Json(restaurant)))
        }
        Err(err) => {
            warn!("Failed to create restaurant: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "delete_restaurant", skip(state), fields(restaurant_id = %restaurant_id))]
pub async fn delete_restaurant(
    State(state): State<ApiState>,
    Path(restaurant_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    match state.restaurant_service.delete_restaurant(restaurant_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => {
            warn!("Failed to delete restaurant {}: {}", restaurant_id, err);
            Err(service_error_to_response(err))
        }
    }
}

/// Map a service error to its HTTP status and `{error, timestamp}` body
pub fn service_error_to_response(err: ServiceError) -> ApiError {
    use crate::models::RepositoryError;

    let (status, message) = match err {
        ServiceError::RestaurantNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::ValidationError { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        ServiceError::Repository { source } => match source {
            RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            RepositoryError::ReadOnly { .. } => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Data source is read-only".to_string(),
            ),
            RepositoryError::ConstraintViolation { message } => (StatusCode::CONFLICT, message),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        },
        ServiceError::Configuration { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Configuration error".to_string(),
        ),
    };

    (
        status,
        Json(json!({
            "error": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
