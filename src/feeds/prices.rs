use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FeedConfig;

/// Normalized price record, shared by the external feed and the crowdsourced
/// reports once they are merged.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceRecord {
    pub product_name: String,
    pub price: f64,
    pub unit: String,
    pub market_location: String,
    pub date_recorded: NaiveDate,
    pub source: String,
    pub currency: String,
}

/// Pull boundary for external market prices. Implementations must degrade to
/// an empty list on failure rather than surface an error to callers.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_latest(&self, days_back: i64) -> Vec<PriceRecord>;
}

/// WFP VAM market price client. Approximate USD conversion applied when the
/// feed reports in dollars.
pub struct WfpPriceFeed {
    client: reqwest::Client,
    config: FeedConfig,
}

const COUNTRY_CODE: &str = "UGA";
const USD_TO_UGX: f64 = 3700.0;

impl WfpPriceFeed {
    pub fn new(config: FeedConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    async fn request_prices(&self, days_back: i64) -> Result<WfpResponse, reqwest::Error> {
        let end_date = Utc::now().date_naive();
        let start_date = end_date - Duration::days(days_back);

        let mut request = self
            .client
            .get(format!("{}/MarketPrices/PriceMonthly", self.config.base_url))
            .query(&[
                ("CountryCode", COUNTRY_CODE.to_string()),
                ("startDate", start_date.format("%Y-%m-%d").to_string()),
                ("endDate", end_date.format("%Y-%m-%d").to_string()),
            ]);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }

        request.send().await?.error_for_status()?.json().await
    }
}

#[async_trait]
impl PriceFeed for WfpPriceFeed {
    async fn fetch_latest(&self, days_back: i64) -> Vec<PriceRecord> {
        match self.request_prices(days_back).await {
            Ok(response) => normalize(response),
            Err(err) => {
                tracing::warn!(error = %err, "market price feed unavailable, returning no records");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WfpResponse {
    #[serde(default)]
    items: Vec<WfpItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WfpItem {
    #[serde(default)]
    commodity_name: String,
    price: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    market_name: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    currency: Option<String>,
}

fn normalize(response: WfpResponse) -> Vec<PriceRecord> {
    let today = Utc::now().date_naive();

    response
        .items
        .into_iter()
        .filter_map(|item| {
            let product_name = item.commodity_name.trim().to_string();
            let price = item.price?;
            if product_name.is_empty() {
                return None;
            }

            let date_recorded = item
                .date
                .as_deref()
                .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
                .unwrap_or(today);

            let price = match item.currency.as_deref() {
                Some("USD") => price * USD_TO_UGX,
                _ => price,
            };

            Some(PriceRecord {
                product_name,
                price,
                unit: item.unit.unwrap_or_else(|| "kg".to_string()).to_lowercase(),
                market_location: item
                    .market_name
                    .unwrap_or_else(|| "Uganda Market".to_string()),
                date_recorded,
                source: "WFP API".to_string(),
                currency: "UGX".to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_skips_items_without_price_or_name() {
        let response = WfpResponse {
            items: vec![
                WfpItem {
                    commodity_name: "Maize".to_string(),
                    price: Some(1200.0),
                    unit: Some("KG".to_string()),
                    market_name: Some("Owino Market".to_string()),
                    date: Some("2026-08-01".to_string()),
                    currency: Some("UGX".to_string()),
                },
                WfpItem {
                    commodity_name: "Beans".to_string(),
                    price: None,
                    unit: None,
                    market_name: None,
                    date: None,
                    currency: None,
                },
                WfpItem {
                    commodity_name: "  ".to_string(),
                    price: Some(5.0),
                    unit: None,
                    market_name: None,
                    date: None,
                    currency: None,
                },
            ],
        };

        let records = normalize(response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_name, "Maize");
        assert_eq!(records[0].unit, "kg");
        assert_eq!(
            records[0].date_recorded,
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
        );
    }

    #[test]
    fn normalize_converts_usd_prices() {
        let response = WfpResponse {
            items: vec![WfpItem {
                commodity_name: "Rice".to_string(),
                price: Some(2.0),
                unit: None,
                market_name: None,
                date: None,
                currency: Some("USD".to_string()),
            }],
        };

        let records = normalize(response);
        assert_eq!(records[0].price, 2.0 * USD_TO_UGX);
        assert_eq!(records[0].currency, "UGX");
    }
}
