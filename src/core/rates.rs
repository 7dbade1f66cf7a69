//! Exchange-rate abstractions and the immutable rate snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

/// Base currency of the catalog and all VAT arithmetic.
pub const BASE_CURRENCY: &str = "CZK";

#[derive(Debug, Error)]
pub enum RateError {
    #[error("Rate feed unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Rate feed format unexpected: {0}")]
    Format(String),
}

/// Snapshot of CZK-per-unit rates as published on a given day.
///
/// Never mutated after construction. A refresh replaces the whole table.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub as_of: DateTime<Utc>,
    rates: BTreeMap<String, Decimal>,
}

impl RateTable {
    /// Builds a table from `(code, czk_per_unit)` pairs. Codes are stored
    /// uppercase and `CZK -> 1` is always present.
    pub fn new<I, S>(as_of: DateTime<Utc>, rates: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        let mut map = BTreeMap::new();
        map.insert(BASE_CURRENCY.to_string(), Decimal::ONE);
        for (code, rate) in rates {
            map.insert(code.as_ref().trim().to_uppercase(), rate);
        }
        // The base currency cannot be overridden by feed content.
        map.insert(BASE_CURRENCY.to_string(), Decimal::ONE);
        Self { as_of, rates: map }
    }

    /// Looks up the CZK-per-unit rate, matching the code case-insensitively.
    pub fn rate(&self, code: &str) -> Option<Decimal> {
        self.rates.get(&code.trim().to_uppercase()).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rate(code).is_some()
    }

    pub fn rates(&self) -> &BTreeMap<String, Decimal> {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Source of the daily rate table.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<RateTable, RateError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_table_always_contains_base_currency() {
        let table = RateTable::new(Utc::now(), Vec::<(String, Decimal)>::new());
        assert_eq!(table.rate("CZK"), Some(Decimal::ONE));
        assert_eq!(table.len(), 1);

        let table = RateTable::new(Utc::now(), vec![("czk", dec!(3)), ("eur", dec!(25))]);
        assert_eq!(table.rate("CZK"), Some(Decimal::ONE));
        assert_eq!(table.rate("EUR"), Some(dec!(25)));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = RateTable::new(Utc::now(), vec![("usd", dec!(22.5))]);
        assert_eq!(table.rate("USD"), Some(dec!(22.5)));
        assert_eq!(table.rate(" usd "), Some(dec!(22.5)));
        assert!(table.contains("Usd"));
        assert!(!table.contains("GBP"));
        assert!(table.rates().contains_key("USD"));
    }
}
