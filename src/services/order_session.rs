use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, instrument, warn};

use crate::config::CatalogConfig;
use crate::models::{Cart, CatalogError, OrderConfirmation, OrderError, Restaurant};
use crate::services::{Catalog, CatalogStatus, CartStore, HttpCatalogLoader};

#[derive(Debug, Default)]
struct SessionView {
    selected: Option<Restaurant>,
    confirmation: Option<OrderConfirmation>,
}

/// One user's ordering flow: browse the catalog, pick a restaurant, fill the cart, validate.
pub struct OrderSession {
    catalog: Arc<Catalog>,
    cart: Arc<CartStore>,
    view: Mutex<SessionView>,
}

impl OrderSession {
    pub fn new(catalog: Arc<Catalog>, cart: Arc<CartStore>) -> Self {
        Self {
            catalog,
            cart,
            view: Mutex::new(SessionView::default()),
        }
    }

    /// Session talking to the menu service over HTTP
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let loader = HttpCatalogLoader::from_config(config)?;
        Ok(Self::new(
            Arc::new(Catalog::new(Arc::new(loader))),
            Arc::new(CartStore::from_config(config)),
        ))
    }

    fn view(&self) -> MutexGuard<'_, SessionView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart_store(&self) -> &CartStore {
        &self.cart
    }

    /// Reload the restaurant list
    pub async fn load_restaurants(&self) -> CatalogStatus {
        self.catalog.reload().await
    }

    pub fn restaurants(&self) -> Vec<Restaurant> {
        self.catalog.restaurants()
    }

    pub fn selected_restaurant(&self) -> Option<Restaurant> {
        self.view().selected.clone()
    }

    #[instrument(skip(self))]
    pub fn select_restaurant(&self, restaurant_id: i64) -> Result<Restaurant, OrderError> {
        let restaurant = self
            .catalog
            .find_restaurant(restaurant_id)
            .ok_or(OrderError::RestaurantNotFound { id: restaurant_id })?;

        info!(restaurant = %restaurant.name, "Restaurant selected");
        self.view().selected = Some(restaurant.clone());
        Ok(restaurant)
    }

    /// Leave the menu view; the cart does not survive going back to the list
    #[instrument(skip(self))]
    pub fn back_to_restaurants(&self) {
        self.view().selected = None;
        self.cart.clear();
    }

    /// Add a dish of the selected restaurant.
    ///
    /// Returns `None` when nothing was added: no restaurant selected, unknown
    /// dish, or a dish flagged unavailable.
    #[instrument(skip(self))]
    pub fn add_to_cart(&self, dish_id: i64) -> Option<Arc<Cart>> {
        let restaurant = self.view().selected.clone()?;

        let dish = match restaurant.find_dish(dish_id) {
            Some(dish) if dish.is_available() => dish.clone(),
            Some(_) => {
                warn!("Dish is not available, ignoring");
                return None;
            }
            None => {
                warn!(restaurant_id = restaurant.id, "Dish not on the selected menu, ignoring");
                return None;
            }
        };

        Some(self.cart.add_item(dish, restaurant))
    }

    pub fn remove_from_cart(&self, dish_id: i64) -> Arc<Cart> {
        self.cart.remove_item(dish_id)
    }

    pub fn update_quantity(&self, dish_id: i64, quantity: i64) -> Arc<Cart> {
        self.cart.update_quantity(dish_id, quantity)
    }

    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    pub fn cart(&self) -> Arc<Cart> {
        self.cart.snapshot()
    }

    /// Validate the order. An empty cart is rejected and nothing changes.
    #[instrument(skip(self))]
    pub fn validate_order(&self) -> Result<OrderConfirmation, OrderError> {
        let cart = self.cart.snapshot();
        if cart.is_empty() {
            warn!("Order rejected, cart is empty");
            return Err(OrderError::EmptyCart);
        }

        let confirmation = OrderConfirmation::from_cart(&cart);
        info!(
            order_id = %confirmation.order_id,
            total_items = confirmation.total_items,
            total_price = %confirmation.total_price,
            "Order validated"
        );
        self.view().confirmation = Some(confirmation.clone());
        Ok(confirmation)
    }

    pub fn pending_confirmation(&self) -> Option<OrderConfirmation> {
        self.view().confirmation.clone()
    }

    /// Dismiss the confirmation: the cart is emptied and the user is back on the restaurant list
    #[instrument(skip(self))]
    pub fn close_confirmation(&self) -> Option<OrderConfirmation> {
        let confirmation = {
            let mut view = self.view();
            view.selected = None;
            view.confirmation.take()
        };
        self.cart.clear();
        confirmation
    }
}
