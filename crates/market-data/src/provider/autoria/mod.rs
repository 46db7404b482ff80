//! AutoRia developers API client.
//!
//! Two endpoints of the public developers.ria.com API:
//! - `/auto/categories/{category}/marks/{mark}/models` - model catalog
//! - `/auto/average_price` - interquartile-mean price over current listings
//!
//! Both require an `api_key` query credential. The API also rejects
//! requests without a descriptive User-Agent with 403, so the client
//! always sends one.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::UpstreamError;
use crate::models::{AveragePrice, AveragePriceQuery, CatalogModel};
use crate::provider::VehicleMarketProvider;

const BASE_URL: &str = "https://developers.ria.com/auto";
const TARGET: &str = "AUTORIA";

/// AutoRia category id for passenger cars.
const PASSENGER_CAR_CATEGORY_ID: i32 = 1;

/// Sent with every request; the API blocks anonymous clients.
const USER_AGENT: &str = "clearcost/0.4 (+https://clearcost.app)";

/// AutoRia catalog and market price provider.
pub struct AutoRiaProvider {
    client: Client,
    api_key: String,
}

/// Catalog entry as AutoRia lists it: the display name plus the id under
/// a `value` key.
#[derive(Debug, Deserialize)]
struct AutoRiaItem {
    name: String,
    value: i32,
}

/// Average price payload; prices come back as JSON doubles.
#[derive(Debug, Deserialize)]
struct AutoRiaAveragePrice {
    #[serde(rename = "interQuartileMean")]
    inter_quartile_mean: f64,
    #[serde(default)]
    total: i64,
}

impl AutoRiaProvider {
    /// Create a provider with the given API key.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    /// Make a request and decode the JSON body.
    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, UpstreamError> {
        debug!("AutoRia request: {}", url.replace(&self.api_key, "***"));

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
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::InvalidPayload {
                target: TARGET.to_string(),
                message: e.to_string(),
            })
    }

    fn convert_price(payload: &AutoRiaAveragePrice) -> Result<AveragePrice, UpstreamError> {
        let price_usd = Decimal::from_f64(payload.inter_quartile_mean)
            .ok_or_else(|| UpstreamError::InvalidPayload {
                target: TARGET.to_string(),
                message: format!(
                    "interQuartileMean {} is not a finite number",
                    payload.inter_quartile_mean
                ),
            })?
            .round_dp(2);

        Ok(AveragePrice {
            price_usd,
            sample_count: payload.total,
        })
    }
}

#[async_trait]
impl VehicleMarketProvider for AutoRiaProvider {
    fn target(&self) -> &'static str {
        TARGET
    }

    async fn models_of_brand(&self, brand_id: i32) -> Result<Vec<CatalogModel>, UpstreamError> {
        let url = format!(
            "{}/categories/{}/marks/{}/models?api_key={}",
            BASE_URL, PASSENGER_CAR_CATEGORY_ID, brand_id, self.api_key
        );

        let items: Vec<AutoRiaItem> = self.fetch(url).await?;

        Ok(items
            .into_iter()
            .map(|item| CatalogModel {
                id: item.value,
                name: item.name,
            })
            .collect())
    }

    async fn average_price(
        &self,
        query: &AveragePriceQuery,
    ) -> Result<AveragePrice, UpstreamError> {
        // `yers` is not a typo on our side; that is the upstream parameter name.
        let mut url = format!(
            "{}/average_price?api_key={}&category_id={}&marka_id={}&model_id={}&yers={}",
            BASE_URL,
            self.api_key,
            PASSENGER_CAR_CATEGORY_ID,
            query.brand_id,
            query.model_id,
            query.year
        );
        if let Some(fuel_id) = query.fuel_id {
            url.push_str(&format!("&fuel_id={}", fuel_id));
        }

        let payload: AutoRiaAveragePrice = self.fetch(url).await?;
        Self::convert_price(&payload)
    }
}
