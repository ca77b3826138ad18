// Repositories module - data access layer

pub mod json_repository;
pub mod restaurant_repository;

pub use json_repository::JsonRestaurantRepository;
pub use restaurant_repository::{InMemoryRestaurantRepository, RestaurantRepository};
