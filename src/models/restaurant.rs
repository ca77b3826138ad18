use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(default, alias = "disponible", skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

/// A vendor with its ordered menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    #[serde(default, alias = "plats")]
    pub dishes: Vec<Dish>,
}

/// Request model for creating a restaurant with its menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRestaurantRequest {
    pub name: String,
    #[serde(default, alias = "plats")]
    pub dishes: Vec<CreateDishRequest>,
}

/// Request model for a dish inside a restaurant creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDishRequest {
    pub name: String,
    pub price: Decimal,
    #[serde(default, alias = "disponible")]
    pub available: Option<bool>,
}

impl Dish {
    pub fn new(id: i64, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            available: None,
        }
    }

    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    /// A dish without an explicit flag is orderable
    pub fn is_available(&self) -> bool {
        self.available.unwrap_or(true)
    }
}

impl Restaurant {
    pub fn new(id: i64, name: impl Into<String>, dishes: Vec<Dish>) -> Self {
        Self {
            id,
            name: name.into(),
            dishes,
        }
    }

    /// Find a dish on this restaurant's menu
    pub fn find_dish(&self, dish_id: i64) -> Option<&Dish> {
        self.dishes.iter().find(|dish| dish.id == dish_id)
    }

    /// Dishes that can currently be ordered, in menu order
    pub fn available_dishes(&self) -> impl Iterator<Item = &Dish> {
        self.dishes.iter().filter(|dish| dish.is_available())
    }
}

/// Unsaved restaurant: id 0 everywhere, the repository assigns real ids
impl From<CreateRestaurantRequest> for Restaurant {
    fn from(request: CreateRestaurantRequest) -> Self {
        let dishes = request
            .dishes
            .into_iter()
            .map(|dish| Dish {
                id: 0,
                name: dish.name.trim().to_string(),
                price: dish.price,
                available: dish.available,
            })
            .collect();

        Restaurant::new(0, request.name.trim(), dishes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_test_restaurant() -> Restaurant {
        Restaurant::new(
            1,
            "Chez Lulu",
            vec![
                Dish::new(10, "Ratatouille", dec!(12.50)),
                Dish::new(11, "Tarte Tatin", dec!(6.00)).with_availability(false),
            ],
        )
    }

    #[test]
    fn test_dish_availability_defaults_to_true() {
        let dish = Dish::new(1, "Soupe", dec!(4.00));
        assert!(dish.available.is_none());
        assert!(dish.is_available());
        assert!(!dish.with_availability(false).is_available());
    }

    #[test]
    fn test_find_dish() {
        let restaurant = create_test_restaurant();

        assert_eq!(restaurant.find_dish(10).map(|d| d.name.as_str()), Some("Ratatouille"));
        assert!(restaurant.find_dish(99).is_none());
    }

    #[test]
    fn test_available_dishes_skips_sold_out() {
        let restaurant = create_test_restaurant();
        let ids: Vec<i64> = restaurant.available_dishes().map(|d| d.id).collect();
        assert_eq!(ids, vec![10]);
    }

    #[test]
    fn test_deserialize_legacy_field_names() {
        let json = r#"{
            "id": 3,
            "name": "Le Bistrot",
            "plats": [
                {"id": 7, "name": "Croque", "price": 8.5, "disponible": false},
                {"id": 8, "name": "Salade", "price": "7.20"}
            ]
        }"#;

        let restaurant: Restaurant = serde_json::from_str(json).unwrap();

        assert_eq!(restaurant.dishes.len(), 2);
        assert_eq!(restaurant.dishes[0].price, dec!(8.5));
        assert_eq!(restaurant.dishes[0].available, Some(false));
        assert_eq!(restaurant.dishes[1].price, dec!(7.20));
        assert!(restaurant.dishes[1].is_available());
    }

    #[test]
    fn test_restaurant_without_dishes_field() {
        let restaurant: Restaurant = serde_json::from_str(r#"{"id": 4, "name": "Vide"}"#).unwrap();
        assert!(restaurant.dishes.is_empty());
    }

    #[test]
    fn test_from_create_request() {
        let request = CreateRestaurantRequest {
            name: "  Chez Lulu ".to_string(),
            dishes: vec![CreateDishRequest {
                name: "Gratin".to_string(),
                price: dec!(9.90),
                available: Some(false),
            }],
        };

        let restaurant = Restaurant::from(request);

        assert_eq!(restaurant.id, 0);
        assert_eq!(restaurant.name, "Chez Lulu");
        assert_eq!(restaurant.dishes[0].id, 0);
        assert!(!restaurant.dishes[0].is_available());
    }

    #[test]
    fn test_serialization_omits_missing_availability() {
        let json = serde_json::to_value(Dish::new(1, "Soupe", dec!(4.00))).unwrap();
        assert!(json.get("available").is_none());
    }
}
