pub mod cli;
pub mod core;
pub mod providers;
pub mod service;
pub mod store;
pub mod web;

use crate::core::catalog::{Catalog, StaticCatalog};
use crate::core::clock::SystemClock;
use crate::core::config::AppConfig;
use crate::core::order::CartLine;
use crate::providers::{CnbRateSource, RateCache};
use crate::service::QuoteService;
use crate::store::{InMemoryCustomerStore, InMemoryOrderStore};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Serve,
    Quote {
        items: Vec<CartLine>,
        currency: Option<String>,
    },
    Rates {
        refresh: bool,
    },
    Products,
}

/// Wires the catalog, rate feed, cache and in-memory stores together.
pub fn build_service(config: &AppConfig) -> Result<QuoteService> {
    let catalog: Arc<dyn Catalog> = match &config.products {
        Some(products) => Arc::new(StaticCatalog::from_products(products.clone())),
        None => Arc::new(StaticCatalog::seeded()),
    };

    let source = CnbRateSource::from_config(&config.rates)?;
    let rates = RateCache::new(Arc::new(source), Arc::new(SystemClock), config.rates.ttl());

    Ok(QuoteService::new(
        catalog,
        rates,
        Arc::new(InMemoryCustomerStore::new()),
        Arc::new(InMemoryOrderStore::new()),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("cartquote starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let service = build_service(&config)?;

    match command {
        AppCommand::Serve => web::serve(&config.server, Arc::new(service)).await,
        AppCommand::Quote { items, currency } => {
            cli::quote::run(&service, &items, currency.as_deref()).await
        }
        AppCommand::Rates { refresh } => cli::rates::run(&service, refresh).await,
        AppCommand::Products => {
            cli::products::run(service.list_products());
            Ok(())
        }
    }
}
