//! Customer registration and the customer lookup seam.

use crate::core::error::ValidationErrors;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl NewCustomer {
    /// Checks every field and reports all problems at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.full_name.trim().chars().count() < 3 {
            errors.add("fullName", "Enter a name (at least 3 characters).");
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            errors.add("email", "Enter an email address.");
        }
        if self.phone.trim().is_empty() {
            errors.add("phone", "Enter a phone number.");
        }
        if self.address.trim().chars().count() < 6 {
            errors.add("address", "Enter an address.");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Stores the customer under a freshly assigned id.
    async fn add(&self, customer: NewCustomer) -> Customer;
    async fn get(&self, id: i64) -> Option<Customer>;

    async fn exists(&self, id: i64) -> bool {
        self.get(id).await.is_some()
    }
}
