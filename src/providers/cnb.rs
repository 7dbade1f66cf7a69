//! Daily exchange rates published by the Czech National Bank.
//!
//! The feed is plain text:
//!
//! ```text
//! 17.10.2026 #201
//! země|měna|množství|kód|kurz
//! EMU|euro|1|EUR|24,335
//! Japonsko|jen|100|JPY|15,234
//! ```
//!
//! Each row quotes `amount` units of a currency in CZK, so the per-unit rate
//! is `rate / amount`.

use crate::core::config::RatesConfig;
use crate::core::rates::{RateError, RateSource, RateTable};
use crate::providers::util::with_retry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DAILY_RATES_PATH: &str =
    "/cs/financni_trhy/devizovy_trh/kurzy_devizoveho_trhu/denni_kurz.txt";

const RETRY_DELAY_MS: u64 = 250;

/// Why a data row did not make it into the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooFewFields(usize),
    InvalidCode(String),
    InvalidNumber(String),
    NonPositive,
    Overflow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewFields(n) => write!(f, "expected 5 fields, found {n}"),
            SkipReason::InvalidCode(code) => write!(f, "invalid currency code '{code}'"),
            SkipReason::InvalidNumber(value) => write!(f, "invalid number '{value}'"),
            SkipReason::NonPositive => write!(f, "amount and rate must be positive"),
            SkipReason::Overflow => write!(f, "per-unit rate is out of range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based position among the non-empty lines of the feed.
    pub line_no: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct ParsedRates {
    pub table: RateTable,
    pub skipped: Vec<SkippedLine>,
}

fn parse_decimal(raw: &str) -> Result<Decimal, SkipReason> {
    let normalized = raw.trim().replace(',', ".");
    Decimal::from_str(&normalized).map_err(|_| SkipReason::InvalidNumber(raw.trim().to_string()))
}

fn parse_rate_line(line: &str) -> Result<(String, Decimal), SkipReason> {
    let fields: Vec<&str> = line.split('|').collect();
    let [_country, _name, amount, code, rate, ..] = fields.as_slice() else {
        return Err(SkipReason::TooFewFields(fields.len()));
    };

    let code = code.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SkipReason::InvalidCode(code));
    }

    let amount = parse_decimal(amount)?;
    let rate = parse_decimal(rate)?;
    if amount <= Decimal::ZERO || rate <= Decimal::ZERO {
        return Err(SkipReason::NonPositive);
    }

    let per_unit = rate.checked_div(amount).ok_or(SkipReason::Overflow)?;
    Ok((code, per_unit))
}

/// Reads the `DD.MM.YYYY` publication date at the start of the first line.
fn parse_header_date(line: &str) -> Option<DateTime<Utc>> {
    let token = line.split_whitespace().next()?;
    NaiveDate::parse_from_str(token, "%d.%m.%Y")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

/// Parses the daily rate text into a [`RateTable`].
///
/// Malformed data rows are skipped and reported in [`ParsedRates::skipped`];
/// only a feed with no data rows at all is an error. `fetched_at` is used as
/// the table date when the header carries none.
pub fn parse_rate_table(text: &str, fetched_at: DateTime<Utc>) -> Result<ParsedRates, RateError> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < 3 {
        return Err(RateError::Format(format!(
            "expected a date line, a header line and rate rows, got {} line(s)",
            lines.len()
        )));
    }

    let as_of = lines
        .first()
        .and_then(|l| parse_header_date(l))
        .unwrap_or(fetched_at);

    let (rates, skipped) = lines.iter().enumerate().skip(2).fold(
        (Vec::new(), Vec::new()),
        |(mut rates, mut skipped), (idx, line)| {
            match parse_rate_line(line) {
                Ok(entry) => rates.push(entry),
                Err(reason) => skipped.push(SkippedLine {
                    line_no: idx + 1,
                    reason,
                }),
            }
            (rates, skipped)
        },
    );

    Ok(ParsedRates {
        table: RateTable::new(as_of, rates),
        skipped,
    })
}

/// Fetches the CNB daily rate table over HTTP.
pub struct CnbRateSource {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
}

impl CnbRateSource {
    pub fn new(base_url: &str, timeout: Duration, retries: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("cartquote/1.0")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for the rate feed")?;

        Ok(CnbRateSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retries,
        })
    }

    pub fn from_config(config: &RatesConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout(), config.retries)
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, DAILY_RATES_PATH)
    }
}

#[async_trait]
impl RateSource for CnbRateSource {
    #[instrument(name = "cnb_fetch", skip(self), fields(url = %self.url()))]
    async fn fetch(&self) -> Result<RateTable, RateError> {
        let url = self.url();
        debug!("Requesting daily rates from {}", url);

        let response = with_retry(|| self.client.get(&url).send(), self.retries, RETRY_DELAY_MS)
            .await
            .map_err(|e| {
                warn!(error = %e, "Rate feed request failed");
                RateError::UpstreamUnavailable(format!("Request error: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Rate feed returned an error status");
            return Err(RateError::UpstreamUnavailable(format!("HTTP error: {status}")));
        }

        let text = response.text().await.map_err(|e| {
            RateError::UpstreamUnavailable(format!("Failed to read response body: {e}"))
        })?;

        let parsed = parse_rate_table(&text, Utc::now())?;
        for skipped in &parsed.skipped {
            debug!(line = skipped.line_no, reason = %skipped.reason, "Skipped rate line");
        }
        debug!(
            "Parsed {} rates as of {}",
            parsed.table.len(),
            parsed.table.as_of
        );
        Ok(parsed.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE: &str = "17.10.2026 #201
země|měna|množství|kód|kurz
Austrálie|dolar|1|AUD|14,844
EMU|euro|1|EUR|24,335
Japonsko|jen|100|JPY|15,234
Maďarsko|forint|100|HUF|6,211
";

    pub async fn create_mock_server(response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(DAILY_RATES_PATH))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn source(server: &MockServer) -> CnbRateSource {
        CnbRateSource::new(&server.uri(), Duration::from_millis(500), 0).unwrap()
    }

    #[test]
    fn test_parse_normalizes_amounts() {
        let parsed = parse_rate_table(SAMPLE, Utc::now()).unwrap();
        let table = &parsed.table;

        assert!(parsed.skipped.is_empty());
        assert_eq!(table.len(), 5);
        assert_eq!(table.rate("CZK"), Some(Decimal::ONE));
        assert_eq!(table.rate("EUR"), Some(dec!(24.335)));
        assert_eq!(table.rate("jpy"), Some(dec!(0.15234)));
        assert_eq!(table.rate("HUF"), Some(dec!(0.06211)));
        assert_eq!(
            table.as_of.date_naive(),
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
        );
    }

    #[test]
    fn test_parse_skips_malformed_rows() {
        let text = "17.10.2026 #201
země|měna|množství|kód|kurz
EMU|euro|1|EUR|24,335
Nikde|nic|0|XXA|10,000
Nikde|nic|1|XXB|-3,5
Nikde|nic|1|XXC
Nikde|nic|jedna|XXD|1,0
Nikde|nic|1||1,0
USA|dolar|1|usd|22,117
";
        let parsed = parse_rate_table(text, Utc::now()).unwrap();
        let table = &parsed.table;

        assert_eq!(table.len(), 3);
        assert_eq!(table.rate("USD"), Some(dec!(22.117)));
        for code in ["XXA", "XXB", "XXC", "XXD"] {
            assert!(!table.contains(code), "{code} should have been skipped");
        }

        let reasons: Vec<_> = parsed.skipped.iter().map(|s| s.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::NonPositive,
                SkipReason::NonPositive,
                SkipReason::TooFewFields(4),
                SkipReason::InvalidNumber("jedna".to_string()),
                SkipReason::InvalidCode(String::new()),
            ]
        );
        assert_eq!(parsed.skipped[0].line_no, 4);
    }

    #[test]
    fn test_parse_skips_row_whose_rate_overflows() {
        let text = "17.10.2026 #201
země|měna|množství|kód|kurz
Nikde|nic|0,0000000000000000000000001|AAA|79228162514264337593543950335
EMU|euro|1|EUR|24,335
";
        let parsed = parse_rate_table(text, Utc::now()).unwrap();

        assert!(!parsed.table.contains("AAA"));
        assert_eq!(parsed.table.rate("EUR"), Some(dec!(24.335)));
        assert_eq!(
            parsed.skipped,
            vec![SkippedLine {
                line_no: 3,
                reason: SkipReason::Overflow,
            }]
        );
    }

    #[test]
    fn test_parse_keeps_base_currency_at_one() {
        let text = "17.10.2026 #201\nhlavička\nČesko|koruna|1|CZK|2,5\n";
        let parsed = parse_rate_table(text, Utc::now()).unwrap();
        assert_eq!(parsed.table.rate("CZK"), Some(Decimal::ONE));
    }

    #[test]
    fn test_parse_rejects_feed_without_rows() {
        let result = parse_rate_table("17.10.2026 #201\nzemě|měna|množství|kód|kurz\n\n", Utc::now());
        assert!(matches!(result, Err(RateError::Format(_))));

        let result = parse_rate_table("", Utc::now());
        assert!(matches!(result, Err(RateError::Format(_))));
    }

    #[test]
    fn test_parse_falls_back_to_fetch_time_without_header_date() {
        let fetched_at = Utc::now();
        let text = "kurzy\nzemě|měna|množství|kód|kurz\nEMU|euro|1|EUR|24,335\n";
        let parsed = parse_rate_table(text, fetched_at).unwrap();
        assert_eq!(parsed.table.as_of, fetched_at);
    }

    #[test]
    fn test_parse_handles_crlf_line_endings() {
        let text = SAMPLE.replace('\n', "\r\n");
        let parsed = parse_rate_table(&text, Utc::now()).unwrap();
        assert_eq!(parsed.table.rate("AUD"), Some(dec!(14.844)));
    }

    #[tokio::test]
    async fn test_successful_fetch() {
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(SAMPLE)).await;

        let table = source(&mock_server).fetch().await.unwrap();
        assert_eq!(table.rate("EUR"), Some(dec!(24.335)));
        assert_eq!(table.len(), 5);
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mock_server = create_mock_server(ResponseTemplate::new(500)).await;

        let result = source(&mock_server).fetch().await;
        match result {
            Err(RateError::UpstreamUnavailable(msg)) => {
                assert_eq!(msg, "HTTP error: 500 Internal Server Error")
            }
            other => panic!("Expected upstream failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_too_short_feed() {
        let mock_server = create_mock_server(
            ResponseTemplate::new(200).set_body_string("17.10.2026 #201\nzemě|měna|množství|kód|kurz\n"),
        )
        .await;

        let result = source(&mock_server).fetch().await;
        assert!(matches!(result, Err(RateError::Format(_))));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let mock_server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(SAMPLE)
                .set_delay(Duration::from_secs(2)),
        )
        .await;

        let result = source(&mock_server).fetch().await;
        assert!(matches!(result, Err(RateError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let source = CnbRateSource::new("http://127.0.0.1:9", Duration::from_millis(500), 1).unwrap();
        let result = source.fetch().await;
        assert!(matches!(result, Err(RateError::UpstreamUnavailable(_))));
    }
}
