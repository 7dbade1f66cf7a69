//! In-memory collaborators for customers and orders.

pub mod memory;

pub use memory::{InMemoryCustomerStore, InMemoryOrderStore};
