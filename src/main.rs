use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use speedliv_rs::{
    handlers::create_app,
    init_observability,
    observability::Metrics,
    repositories::{InMemoryRestaurantRepository, JsonRestaurantRepository},
    services::RestaurantService,
    shutdown_observability, Config,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_environment()?;

    init_observability(&config.observability)?;

    info!(
        "Starting {} v{}",
        config.observability.service_name, config.observability.service_version
    );

    let metrics = Arc::new(Metrics::new()?);

    let strategy = config.datasource.datasource_strategy;
    info!(strategy = %strategy, "Using restaurant data source");

    let memory = Arc::new(InMemoryRestaurantRepository::new());
    if strategy.uses_memory() {
        let seed_path = &config.datasource.seed_json_path;
        match memory.seed_from_file(seed_path).await {
            Ok(count) => info!("Memory store seeded with {} restaurants", count),
            Err(e) => warn!(
                path = %seed_path.display(),
                error = %e,
                "Could not seed memory store, starting empty"
            ),
        }
    }

    let json = if strategy.uses_json() {
        JsonRestaurantRepository::load(&config.datasource.restaurants_json_path).await
    } else {
        JsonRestaurantRepository::from_restaurants(
            &config.datasource.restaurants_json_path,
            Vec::new(),
        )
    };

    let restaurant_service = Arc::new(
        RestaurantService::new(strategy, memory, Arc::new(json)).with_metrics(metrics.clone()),
    );

    let app = create_app(
        metrics,
        restaurant_service,
        config.server.request_timeout(),
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
        shutdown_observability().await;
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
