//! Server-side cart pricing in CZK with conversion to a target currency.
//!
//! Everything here is pure: catalog lookups and rate tables are passed in
//! already resolved. Amounts shown to a customer go through [`round2`], which
//! rounds half away from zero rather than `Decimal`'s default banker's rounding.

use crate::core::catalog::Catalog;
use crate::core::error::ServiceError;
use crate::core::order::CartLine;
use crate::core::rates::RateTable;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Czech standard VAT rate (21 %).
pub const VAT_RATE: Decimal = Decimal::from_parts(21, 0, 0, false, 2);

pub const MIN_QUANTITY: i64 = 1;
pub const MAX_QUANTITY: i64 = 999;

/// Full price breakdown for a cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal_czk: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_czk: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_czk: Decimal,
    pub target_currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_czk_per_unit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_in_currency: Decimal,
}

pub fn round2(x: Decimal) -> Decimal {
    x.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn validate_quantity(line: &CartLine) -> Result<(), ServiceError> {
    if (MIN_QUANTITY..=MAX_QUANTITY).contains(&line.quantity) {
        Ok(())
    } else {
        Err(ServiceError::InvalidQuantity {
            product_id: line.product_id,
            quantity: line.quantity,
        })
    }
}

/// Sums `unit_price * quantity` over all lines.
pub fn compute_subtotal(lines: &[CartLine], catalog: &dyn Catalog) -> Result<Decimal, ServiceError> {
    lines.iter().try_fold(Decimal::ZERO, |acc, line| {
        validate_quantity(line)?;
        let product = catalog
            .find_product(line.product_id)
            .ok_or(ServiceError::InvalidProduct(line.product_id))?;
        product
            .unit_price_czk
            .checked_mul(Decimal::from(line.quantity))
            .and_then(|line_total| acc.checked_add(line_total))
            .ok_or(ServiceError::AmountOutOfRange)
    })
}

pub fn compute_vat(subtotal: Decimal) -> Result<Decimal, ServiceError> {
    subtotal
        .checked_mul(VAT_RATE)
        .map(round2)
        .ok_or(ServiceError::AmountOutOfRange)
}

pub fn compute_total_czk(subtotal: Decimal, vat: Decimal) -> Result<Decimal, ServiceError> {
    subtotal
        .checked_add(vat)
        .map(round2)
        .ok_or(ServiceError::AmountOutOfRange)
}

/// Trims and uppercases a currency code; it must be exactly three ASCII letters.
pub fn normalize_currency(raw: &str) -> Result<String, ServiceError> {
    let code = raw.trim().to_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(ServiceError::InvalidCurrency(raw.trim().to_string()))
    }
}

/// Converts a CZK amount into `target`, returning the rate used and the
/// rounded amount.
pub fn convert(
    total_czk: Decimal,
    table: &RateTable,
    target: &str,
) -> Result<(Decimal, Decimal), ServiceError> {
    let code = normalize_currency(target)?;
    let rate = table
        .rate(&code)
        .filter(|r| r.is_sign_positive() && !r.is_zero())
        .ok_or(ServiceError::UnknownCurrency(code))?;
    let converted = total_czk
        .checked_div(rate)
        .ok_or(ServiceError::AmountOutOfRange)?;
    Ok((rate, round2(converted)))
}

/// Whole-unit amount persisted on a placed order.
pub fn to_stored_integer(total_in_currency: Decimal) -> Result<i64, ServiceError> {
    total_in_currency
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(ServiceError::AmountOutOfRange)
}

/// Cart totals in the base currency, before any conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CzkTotals {
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

impl CzkTotals {
    pub fn compute(lines: &[CartLine], catalog: &dyn Catalog) -> Result<Self, ServiceError> {
        let subtotal = compute_subtotal(lines, catalog)?;
        let vat = compute_vat(subtotal)?;
        Ok(Self {
            subtotal,
            vat,
            total: compute_total_czk(subtotal, vat)?,
        })
    }

    /// Full breakdown with the total expressed in `target`.
    pub fn convert(&self, table: &RateTable, target: &str) -> Result<PricingResult, ServiceError> {
        let target_currency = normalize_currency(target)?;
        let (rate, total_in_currency) = convert(self.total, table, &target_currency)?;

        Ok(PricingResult {
            subtotal_czk: round2(self.subtotal),
            vat_czk: self.vat,
            total_czk: self.total,
            target_currency,
            rate_czk_per_unit: round2(rate),
            total_in_currency,
        })
    }
}

/// Prices `lines` in CZK and converts the total using `table`.
pub fn price_cart(
    lines: &[CartLine],
    catalog: &dyn Catalog,
    table: &RateTable,
    target: &str,
) -> Result<PricingResult, ServiceError> {
    CzkTotals::compute(lines, catalog)?.convert(table, target)
}
