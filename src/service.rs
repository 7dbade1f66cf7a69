//! Quote and order orchestration over the catalog, rate cache and stores.
//!
//! Prices are always derived here from the catalog; anything a client sends
//! as a total is ignored.

use crate::core::catalog::{Catalog, Product};
use crate::core::customer::{Customer, CustomerStore, NewCustomer};
use crate::core::error::{ServiceError, ValidationErrors};
use crate::core::order::{CartLine, FinalizedOrder, OrderRequest, OrderStore, PlacedOrder};
use crate::core::pricing::{self, CzkTotals, PricingResult};
use crate::core::rates::{BASE_CURRENCY, RateTable};
use crate::providers::RateCache;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct QuoteService {
    catalog: Arc<dyn Catalog>,
    rates: RateCache,
    customers: Arc<dyn CustomerStore>,
    orders: Arc<dyn OrderStore>,
}

impl QuoteService {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        rates: RateCache,
        customers: Arc<dyn CustomerStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            catalog,
            rates,
            customers,
            orders,
        }
    }

    pub fn list_products(&self) -> &[Product] {
        self.catalog.list_products()
    }

    pub async fn current_rates(&self) -> Result<Arc<RateTable>, ServiceError> {
        Ok(self.rates.get_rates().await?)
    }

    pub async fn refresh_rates(&self) -> Result<Arc<RateTable>, ServiceError> {
        self.rates.invalidate().await;
        self.current_rates().await
    }

    /// Prices a prospective cart without persisting anything.
    ///
    /// All input checks run before the rate table is requested, so invalid
    /// carts never trigger an upstream fetch.
    #[instrument(skip(self, lines), fields(items = lines.len()))]
    pub async fn quote(
        &self,
        lines: &[CartLine],
        target_currency: Option<&str>,
    ) -> Result<PricingResult, ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::EmptyCart);
        }
        let target = pricing::normalize_currency(target_currency.unwrap_or(BASE_CURRENCY))?;
        let totals = CzkTotals::compute(lines, self.catalog.as_ref())?;

        let table = self.rates.get_rates().await?;
        let result = totals.convert(&table, &target)?;
        debug!(
            "Quoted {} CZK as {} {}",
            result.total_czk, result.total_in_currency, result.target_currency
        );
        Ok(result)
    }

    /// Validates an order and computes the whole-unit total to store with it.
    ///
    /// Every field problem is reported together, keyed by request field.
    #[instrument(skip(self, lines), fields(items = lines.len()))]
    pub async fn price_order(
        &self,
        lines: &[CartLine],
        customer_id: i64,
        target_currency: Option<&str>,
    ) -> Result<(i64, String), ServiceError> {
        let mut errors = ValidationErrors::new();

        if !self.customers.exists(customer_id).await {
            errors.add(
                "customerId",
                ServiceError::CustomerNotFound(customer_id).to_string(),
            );
        }
        if lines.is_empty() {
            errors.add("items", "Select at least one product.");
        }
        for line in lines {
            if let Err(e) = pricing::validate_quantity(line) {
                errors.add("quantity", e.to_string());
            }
            if self.catalog.find_product(line.product_id).is_none() {
                errors.add(
                    "productId",
                    ServiceError::InvalidProduct(line.product_id).to_string(),
                );
            }
        }
        let target = pricing::normalize_currency(target_currency.unwrap_or(BASE_CURRENCY))
            .map_err(|e| errors.add("targetCurrency", e.to_string()))
            .ok();

        let Some(target) = target.filter(|_| errors.is_empty()) else {
            debug!("Order rejected: {}", errors);
            return Err(ServiceError::Validation(errors));
        };

        let totals = CzkTotals::compute(lines, self.catalog.as_ref())?;
        let table = self.rates.get_rates().await?;
        let result = totals.convert(&table, &target)?;
        let stored_total = pricing::to_stored_integer(result.total_in_currency)?;

        Ok((stored_total, result.target_currency))
    }

    /// Prices the order and saves it once pricing succeeds.
    pub async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, ServiceError> {
        if let Some(client_total) = request.total {
            debug!("Ignoring client-submitted total {}", client_total);
        }

        let (total, currency) = self
            .price_order(
                &request.items,
                request.customer_id,
                request.target_currency.as_deref(),
            )
            .await?;

        let order = FinalizedOrder {
            customer_id: request.customer_id,
            items: request.items.clone(),
            target_currency: currency.clone(),
            total,
            created_at: Utc::now(),
        };
        let order_id = self.orders.save(order).await?;
        info!(%order_id, total, %currency, "Order placed");

        Ok(PlacedOrder {
            order_id,
            total,
            currency,
        })
    }

    pub async fn get_order(&self, order_id: &str) -> Result<FinalizedOrder, ServiceError> {
        self.orders
            .get(order_id)
            .await
            .ok_or_else(|| ServiceError::OrderNotFound(order_id.to_string()))
    }

    pub async fn register_customer(&self, customer: NewCustomer) -> Result<Customer, ServiceError> {
        customer.validate().map_err(ServiceError::Validation)?;
        let created = self.customers.add(customer).await;
        info!(customer_id = created.id, "Customer registered");
        Ok(created)
    }
}
