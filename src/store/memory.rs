use crate::core::customer::{Customer, CustomerStore, NewCustomer};
use crate::core::order::{FinalizedOrder, OrderStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// Customer registry keyed by an incrementing id, starting at 1.
#[derive(Default)]
pub struct InMemoryCustomerStore {
    inner: Arc<Mutex<HashMap<i64, Customer>>>,
    last_id: AtomicI64,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn add(&self, customer: NewCustomer) -> Customer {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let customer = Customer {
            id,
            full_name: customer.full_name.trim().to_string(),
            email: customer.email.trim().to_string(),
            phone: customer.phone.trim().to_string(),
            address: customer.address.trim().to_string(),
        };

        let mut customers = self.inner.lock().await;
        debug!("Customer PUT for id: {}", id);
        customers.insert(id, customer.clone());
        customer
    }

    async fn get(&self, id: i64) -> Option<Customer> {
        let customers = self.inner.lock().await;
        let customer = customers.get(&id).cloned();
        if customer.is_none() {
            debug!("Customer MISS for id: {}", id);
        }
        customer
    }
}

/// Order storage keyed by a random 32-char hex id.
#[derive(Default)]
pub struct InMemoryOrderStore {
    inner: Arc<Mutex<HashMap<String, FinalizedOrder>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save(&self, order: FinalizedOrder) -> Result<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut orders = self.inner.lock().await;
        debug!("Order PUT for id: {}", id);
        orders.insert(id.clone(), order);
        Ok(id)
    }

    async fn get(&self, order_id: &str) -> Option<FinalizedOrder> {
        let orders = self.inner.lock().await;
        orders.get(order_id).cloned()
    }
}
