use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::{api, health_check, metrics_handler};
use crate::observability::{observability_middleware, Metrics};
use crate::services::RestaurantService;

/// Full menu service: restaurant API, health, metrics, and the middleware stack
pub fn create_app(
    metrics: Arc<Metrics>,
    restaurant_service: Arc<RestaurantService>,
    request_timeout: Duration,
) -> Router {
    let metrics_for_middleware = metrics.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
        .merge(api::create_api_router(restaurant_service))
        // Outermost layer last
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataSourceStrategy;
    use crate::repositories::{InMemoryRestaurantRepository, JsonRestaurantRepository};
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn create_test_app() -> (Router, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        let service = RestaurantService::new(
            DataSourceStrategy::Memory,
            Arc::new(InMemoryRestaurantRepository::new()),
            Arc::new(JsonRestaurantRepository::from_restaurants("unused.json", vec![])),
        );
        let app = create_app(metrics.clone(), Arc::new(service), Duration::from_secs(5));
        (app, metrics)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(Request::get("/health/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin() {
        let (app, _) = create_test_app();

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/restaurants")
            .header("origin", "http://localhost:4200")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_requests_are_measured() {
        let (app, metrics) = create_test_app();

        let response = app
            .oneshot(Request::get("/restaurants").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let counter = metrics
            .http_requests_total
            .with_label_values(&["GET", "/restaurants", "200"]);
        assert_eq!(counter.get(), 1.0);
    }
}
