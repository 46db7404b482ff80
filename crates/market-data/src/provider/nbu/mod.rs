//! National Bank of Ukraine rate provider.
//!
//! Talks to the public NBU statdirectory endpoint:
//! `https://bank.gov.ua/NBUStatService/v1/statdirectory/exchange?valcode=EUR&json`
//!
//! The endpoint answers with a one-element array for a single `valcode`;
//! we consume the first record's rate. No credential is required.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::UpstreamError;
use crate::models::RateQuote;
use crate::provider::RateProvider;

const BASE_URL: &str = "https://bank.gov.ua/NBUStatService/v1/statdirectory/exchange";
const TARGET: &str = "NBU";

/// NBU publishes dates as dd.MM.yyyy.
const NBU_DATE_FORMAT: &str = "%d.%m.%Y";

/// Official UAH exchange rate provider.
pub struct NbuProvider {
    client: Client,
}

/// One record of the statdirectory exchange response.
///
/// The full payload carries more fields (r030 numeric code, txt name);
/// only the ones we consume are mapped.
#[derive(Debug, Deserialize)]
struct NbuRateRecord {
    /// ISO currency code, e.g. "EUR".
    cc: String,
    /// UAH per one unit of `cc`.
    rate: Decimal,
    /// Date the rate is effective for, dd.MM.yyyy.
    #[serde(rename = "exchangedate")]
    exchange_date: String,
}

impl NbuProvider {
    /// Create a provider with its own HTTP client.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    async fn fetch(&self, currency_code: &str) -> Result<Vec<NbuRateRecord>, UpstreamError> {
        // The statdirectory endpoint wants a bare `json` flag, which a query
        // serializer would emit as `json=`; the code itself is one of our
        // tracked ISO constants, so plain interpolation is safe.
        let url = format!("{}?valcode={}&json", BASE_URL, currency_code);

        debug!("NBU request: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout {
                    target: TARGET.to_string(),
                }
            } else {
                UpstreamError::Network(e)
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(UpstreamError::RateLimited {
                target: TARGET.to_string(),
            });
        }
        if !status.is_success() {
            return Err(UpstreamError::Status {
                target: TARGET.to_string(),
                code: status.as_u16(),
            });
        }

        response
            .json::<Vec<NbuRateRecord>>()
            .await
            .map_err(|e| UpstreamError::InvalidPayload {
                target: TARGET.to_string(),
                message: e.to_string(),
            })
    }

    fn parse_record(record: &NbuRateRecord, requested: &str) -> Result<RateQuote, UpstreamError> {
        if !record.cc.eq_ignore_ascii_case(requested) {
            return Err(UpstreamError::InvalidPayload {
                target: TARGET.to_string(),
                message: format!("asked for {}, got {}", requested, record.cc),
            });
        }

        // NBU publishes tomorrow's rate in the evening; fall back to today
        // when the date field is unparseable rather than failing the quote.
        let effective_date = NaiveDate::parse_from_str(&record.exchange_date, NBU_DATE_FORMAT)
            .unwrap_or_else(|_| Utc::now().date_naive());

        Ok(RateQuote {
            currency_code: record.cc.to_uppercase(),
            rate: record.rate,
            effective_date,
        })
    }
}

impl Default for NbuProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for NbuProvider {
    fn target(&self) -> &'static str {
        TARGET
    }

    async fn current_rate(&self, currency_code: &str) -> Result<RateQuote, UpstreamError> {
        let records = self.fetch(currency_code).await?;

        let record = records.first().ok_or_else(|| UpstreamError::InvalidPayload {
            target: TARGET.to_string(),
            message: format!("no rate records for {}", currency_code),
        })?;

        Self::parse_record(record, currency_code)
    }
}
