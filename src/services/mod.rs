// Services module - business logic layer

pub mod cart_store;
pub mod catalog_loader;
pub mod order_session;
pub mod restaurant_service;

pub use cart_store::{CartStore, CartSubscription};
pub use catalog_loader::{
    Catalog, CatalogLoader, CatalogStatus, HttpCatalogLoader, CATALOG_UNAVAILABLE_MESSAGE,
};
pub use order_session::OrderSession;
pub use restaurant_service::RestaurantService;
