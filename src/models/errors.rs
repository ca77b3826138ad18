use thiserror::Error;

/// Service-level errors raised by the restaurant catalog API
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Restaurant not found: {id}")]
    RestaurantNotFound { id: i64 },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Repository error: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Repository-level errors for restaurant data access
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Item not found")]
    NotFound,

    #[error("Data source is read-only: {source_name}")]
    ReadOnly { source_name: String },

    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Validation errors for input data
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredField { field: String },

    #[error("Invalid field value: {field}={value}, reason={reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Field too long: {field}, max_length={max_length}, actual_length={actual_length}")]
    TooLong {
        field: String,
        max_length: usize,
        actual_length: usize,
    },

    #[error("Value out of range: {field}, min={min}, max={max}, value={value}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
        value: String,
    },
}

/// Failure to obtain the restaurant catalog from the backend
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Catalog returned HTTP {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Invalid catalog URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors surfaced by the ordering session
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Restaurant not found: {id}")]
    RestaurantNotFound { id: i64 },
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::ValidationError {
            message: err.to_string(),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ServiceError::RestaurantNotFound { id: 7 };
        assert_eq!(error.to_string(), "Restaurant not found: 7");

        let validation_error = ValidationError::RequiredField {
            field: "restaurant_name".to_string(),
        };
        assert_eq!(
            validation_error.to_string(),
            "Required field missing: restaurant_name"
        );

        assert_eq!(OrderError::EmptyCart.to_string(), "Your cart is empty");
    }

    #[test]
    fn test_error_conversion() {
        let validation_error = ValidationError::InvalidValue {
            field: "price".to_string(),
            value: "-10".to_string(),
            reason: "Price cannot be negative".to_string(),
        };

        let service_error: ServiceError = validation_error.into();
        match service_error {
            ServiceError::ValidationError { message } => {
                assert!(message.contains("Invalid field value"));
            }
            _ => panic!("Expected ValidationError conversion"),
        }
    }

    #[test]
    fn test_repository_error_from_serde() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_error.is_err());

        let repo_error: RepositoryError = json_error.unwrap_err().into();
        match repo_error {
            RepositoryError::Serialization { .. } => {}
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_read_only_error_into_service_error() {
        let service_error: ServiceError = RepositoryError::ReadOnly {
            source_name: "json".to_string(),
        }
        .into();
        assert!(matches!(service_error, ServiceError::Repository { .. }));
        assert_eq!(
            service_error.to_string(),
            "Repository error: Data source is read-only: json"
        );
    }
}
