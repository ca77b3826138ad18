use rust_decimal::Decimal;

use super::{CreateDishRequest, CreateRestaurantRequest, ValidationError, ValidationResult};

/// Trait for validating input models
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

/// Validation constants
pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_DISHES_PER_RESTAURANT: usize = 200;
pub const MIN_PRICE: Decimal = Decimal::ZERO;
pub const MAX_PRICE: Decimal = Decimal::from_parts(999999, 0, 0, false, 2); // 9999.99

impl Validate for CreateRestaurantRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_name("restaurant_name", &self.name)?;
        validate_dish_count(self.dishes.len())?;
        for (index, dish) in self.dishes.iter().enumerate() {
            dish.validate().map_err(|err| match err {
                ValidationError::RequiredField { field } => ValidationError::RequiredField {
                    field: format!("dishes[{}].{}", index, field),
                },
                other => other,
            })?;
        }
        Ok(())
    }
}

impl Validate for CreateDishRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_name("dish_name", &self.name)?;
        validate_dish_price(&self.price)?;
        Ok(())
    }
}

/// Validate a restaurant or dish name
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max_length: MAX_NAME_LENGTH,
            actual_length: trimmed.chars().count(),
        });
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: name.to_string(),
            reason: "Contains invalid control characters".to_string(),
        });
    }

    Ok(())
}

/// Validate dish price
pub fn validate_dish_price(price: &Decimal) -> ValidationResult<()> {
    if *price < MIN_PRICE || *price > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "dish_price".to_string(),
            min: MIN_PRICE.to_string(),
            max: MAX_PRICE.to_string(),
            value: price.to_string(),
        });
    }

    if price.normalize().scale() > 2 {
        return Err(ValidationError::InvalidValue {
            field: "dish_price".to_string(),
            value: price.to_string(),
            reason: "Price cannot have more than 2 decimal places".to_string(),
        });
    }

    Ok(())
}

/// Validate the size of a menu
pub fn validate_dish_count(count: usize) -> ValidationResult<()> {
    if count > MAX_DISHES_PER_RESTAURANT {
        return Err(ValidationError::InvalidValue {
            field: "dishes".to_string(),
            value: count.to_string(),
            reason: format!(
                "Too many dishes, maximum allowed: {}",
                MAX_DISHES_PER_RESTAURANT
            ),
        });
    }
    Ok(())
}
