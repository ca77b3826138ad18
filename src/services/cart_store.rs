use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::{debug, instrument, warn};

use crate::config::CatalogConfig;
use crate::models::{Cart, Dish, Restaurant};

/// Default number of cart states buffered per subscriber
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Holds the order in progress and publishes every new cart state.
///
/// Mutations are serialized by an internal lock and the new state is broadcast
/// while that lock is held, so subscribers receive states in mutation order.
pub struct CartStore {
    current: Mutex<Arc<Cart>>,
    sender: broadcast::Sender<Arc<Cart>>,
}

/// Observer stream of cart states.
///
/// The first item is the cart as it was when the subscription was created;
/// every later item is a newer version.
pub struct CartSubscription {
    initial: Option<Arc<Cart>>,
    receiver: broadcast::Receiver<Arc<Cart>>,
    last_version: Option<u64>,
}

impl CartStore {
    /// Create a new CartStore with an empty cart
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new CartStore buffering up to `capacity` states per subscriber
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            current: Mutex::new(Arc::new(Cart::new())),
            sender,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::with_capacity(config.cart_channel_capacity)
    }

    fn lock(&self) -> MutexGuard<'_, Arc<Cart>> {
        // Every write replaces the whole Arc, so a poisoned guard still holds a consistent cart
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a transition. `None` from the transition means nothing changed and nothing is published.
    fn apply<F>(&self, operation: &'static str, transition: F) -> Arc<Cart>
    where
        F: FnOnce(&Cart) -> Option<Cart>,
    {
        let mut current = self.lock();
        match transition(&current) {
            Some(next) => {
                let next = Arc::new(next);
                *current = next.clone();
                // No subscribers is not an error
                let receivers = self.sender.send(next.clone()).unwrap_or(0);
                debug!(
                    operation,
                    version = next.version(),
                    items = next.len(),
                    receivers,
                    "Published cart state"
                );
                next
            }
            None => {
                debug!(operation, "Cart unchanged, nothing published");
                current.clone()
            }
        }
    }

    /// Add one unit of a dish to the cart
    #[instrument(level = "debug", skip(self, dish, restaurant), fields(dish_id = dish.id, restaurant_id = restaurant.id))]
    pub fn add_item(&self, dish: Dish, restaurant: Restaurant) -> Arc<Cart> {
        self.apply("add_item", |cart| {
            Some(cart.with_item_added(dish, restaurant))
        })
    }

    /// Remove the line for a dish. Unknown ids leave the contents as they are.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_item(&self, dish_id: i64) -> Arc<Cart> {
        self.apply("remove_item", |cart| Some(cart.with_item_removed(dish_id)))
    }

    /// Set the quantity of a line; zero or below removes it. Unknown ids are ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn update_quantity(&self, dish_id: i64, quantity: i64) -> Arc<Cart> {
        let quantity = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
        self.apply("update_quantity", |cart| cart.with_quantity(dish_id, quantity))
    }

    /// Empty the cart
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&self) -> Arc<Cart> {
        self.apply("clear", |cart| Some(cart.cleared()))
    }

    /// Sum of price * quantity over all lines
    pub fn total(&self) -> Decimal {
        self.lock().total_price()
    }

    /// Current cart without subscribing
    pub fn snapshot(&self) -> Arc<Cart> {
        self.lock().clone()
    }

    /// Subscribe to cart states, starting with the current one
    pub fn subscribe(&self) -> CartSubscription {
        // Taken under the lock so no publication falls between the snapshot and the receiver
        let current = self.lock();
        CartSubscription {
            initial: Some(current.clone()),
            receiver: self.sender.subscribe(),
            last_version: None,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartSubscription {
    fn accept(&mut self, cart: Arc<Cart>) -> Option<Arc<Cart>> {
        if self.last_version.is_some_and(|last| cart.version() <= last) {
            return None;
        }
        self.last_version = Some(cart.version());
        Some(cart)
    }

    /// Wait for the next cart state. Returns `None` once the store is dropped.
    pub async fn next(&mut self) -> Option<Arc<Cart>> {
        if let Some(cart) = self.initial.take() {
            return self.accept(cart);
        }

        loop {
            match self.receiver.recv().await {
                Ok(cart) => {
                    if let Some(cart) = self.accept(cart) {
                        return Some(cart);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Cart subscriber lagged, skipping to newer states");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next cart state if one is already available
    pub fn try_next(&mut self) -> Option<Arc<Cart>> {
        if let Some(cart) = self.initial.take() {
            return self.accept(cart);
        }

        loop {
            match self.receiver.try_recv() {
                Ok(cart) => {
                    if let Some(cart) = self.accept(cart) {
                        return Some(cart);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Cart subscriber lagged, skipping to newer states");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
