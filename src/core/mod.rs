//! Core business logic abstractions

pub mod catalog;
pub mod clock;
pub mod config;
pub mod customer;
pub mod error;
pub mod log;
pub mod order;
pub mod pricing;
pub mod rates;

// Re-export main types for cleaner imports
pub use catalog::{Catalog, Product, StaticCatalog};
pub use clock::{Clock, SystemClock};
pub use customer::{Customer, CustomerStore, NewCustomer};
pub use error::{ServiceError, ValidationErrors};
pub use order::{CartLine, FinalizedOrder, OrderRequest, OrderStore, PlacedOrder, QuoteRequest};
pub use pricing::{CzkTotals, PricingResult};
pub use rates::{RateError, RateSource, RateTable};
