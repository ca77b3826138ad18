use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use rust_decimal_macros::dec;
use speedliv_rs::{
    handlers::create_app,
    models::{DataSourceStrategy, Dish, Restaurant},
    observability::Metrics,
    repositories::{InMemoryRestaurantRepository, JsonRestaurantRepository},
    services::RestaurantService,
};
use tokio::net::TcpListener;

pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
    pub metrics: Arc<Metrics>,
}

pub fn seed_restaurants() -> Vec<Restaurant> {
    vec![
        Restaurant::new(
            1,
            "Chez Lulu",
            vec![
                Dish::new(1, "Gratin dauphinois", dec!(5.00)),
                Dish::new(2, "Crepe au sucre", dec!(3.50)),
                Dish::new(3, "Souffle", dec!(9.00)).with_availability(false),
            ],
        ),
        Restaurant::new(
            2,
            "Le Bistrot",
            vec![Dish::new(4, "Croque monsieur", dec!(8.00))],
        ),
    ]
}

impl TestEnvironment {
    /// Menu service with a seeded memory store, served on an ephemeral port
    pub async fn new() -> Self {
        Self::with_sources(DataSourceStrategy::Memory, Vec::new()).await
    }

    pub async fn with_sources(
        strategy: DataSourceStrategy,
        json_restaurants: Vec<Restaurant>,
    ) -> Self {
        let memory = Arc::new(InMemoryRestaurantRepository::new());
        memory
            .seed(seed_restaurants())
            .await
            .expect("Failed to seed memory store");
        let json = Arc::new(JsonRestaurantRepository::from_restaurants(
            "data/restaurants.json",
            json_restaurants,
        ));

        let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));
        let service = RestaurantService::new(strategy, memory, json).with_metrics(metrics.clone());
        let app = create_app(metrics.clone(), Arc::new(service), Duration::from_secs(5));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to serve app");
        });

        Self {
            client: Client::new(),
            base_url,
            metrics,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
