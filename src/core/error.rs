//! Errors raised while pricing carts, placing orders and registering customers.

use crate::core::rates::RateError;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field-keyed validation messages, e.g. `customerId -> "CustomerId does not exist."`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`. A later message for the same field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request body is invalid: {0}")]
    InvalidBody(String),

    #[error("Cart is empty.")]
    EmptyCart,

    #[error("Quantity must be between 1 and 999 (got {quantity} for product {product_id}).")]
    InvalidQuantity { product_id: i64, quantity: i64 },

    #[error("Invalid productId: {0}")]
    InvalidProduct(i64),

    #[error("Cart total is out of range.")]
    AmountOutOfRange,

    #[error("Currency must have exactly 3 letters (CZK/EUR/...), got '{0}'.")]
    InvalidCurrency(String),

    #[error("Currency {0} is not in the CNB rate table.")]
    UnknownCurrency(String),

    #[error("CustomerId {0} does not exist.")]
    CustomerNotFound(i64),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Rates(#[from] RateError),

    #[error("Order {0} not found.")]
    OrderNotFound(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    /// Request field the error refers to, for input errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidBody(_) => Some("body"),
            Self::EmptyCart | Self::AmountOutOfRange => Some("items"),
            Self::InvalidQuantity { .. } => Some("quantity"),
            Self::InvalidProduct(_) => Some("productId"),
            Self::InvalidCurrency(_) | Self::UnknownCurrency(_) => Some("targetCurrency"),
            Self::CustomerNotFound(_) => Some("customerId"),
            _ => None,
        }
    }

    /// Whether the caller sent something invalid, as opposed to a service failure.
    pub fn is_client_error(&self) -> bool {
        self.field().is_some() || matches!(self, Self::Validation(_))
    }

    /// Field-keyed view of the error, as returned by the order endpoint.
    pub fn to_validation_errors(&self) -> Option<ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors.clone()),
            other => other.field().map(|field| {
                let mut errors = ValidationErrors::new();
                errors.add(field, other.to_string());
                errors
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_for_input_errors() {
        assert_eq!(ServiceError::EmptyCart.field(), Some("items"));
        assert_eq!(
            ServiceError::InvalidQuantity {
                product_id: 1,
                quantity: 0
            }
            .field(),
            Some("quantity")
        );
        assert_eq!(ServiceError::InvalidProduct(9).field(), Some("productId"));
        assert_eq!(ServiceError::AmountOutOfRange.field(), Some("items"));
        assert_eq!(
            ServiceError::UnknownCurrency("XYZ".into()).field(),
            Some("targetCurrency")
        );
        assert_eq!(ServiceError::CustomerNotFound(5).field(), Some("customerId"));
        assert!(
            ServiceError::Rates(RateError::Format("too short".into()))
                .field()
                .is_none()
        );
    }

    #[test]
    fn test_unknown_currency_names_the_code() {
        let err = ServiceError::UnknownCurrency("XYZ".to_string());
        assert!(err.to_string().contains("XYZ"));
        let errors = err.to_validation_errors().unwrap();
        assert!(errors.get("targetCurrency").unwrap().contains("XYZ"));
    }

    #[test]
    fn test_rate_errors_are_not_client_errors() {
        let err = ServiceError::from(RateError::UpstreamUnavailable("timeout".into()));
        assert!(!err.is_client_error());
        assert!(err.to_validation_errors().is_none());
        assert!(ServiceError::EmptyCart.is_client_error());
    }

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.add("items", "Select at least one product.");
        errors.add("customerId", "CustomerId does not exist.");
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "customerId: CustomerId does not exist.; items: Select at least one product."
        );
    }
}
