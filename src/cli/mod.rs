pub mod products;
pub mod quote;
pub mod rates;
pub mod setup;
pub mod ui;
