use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use validator::Validate;

use crate::entities::price_report::{self, Entity as PriceReportEntity};
use crate::error::ApiError;
use crate::feeds::prices::{PriceFeed, PriceRecord};

/// Merge feed records with crowdsourced reports by case-insensitive product
/// name, keeping the most recently dated record per product. The feed wins
/// ties.
pub fn combine_price_sources(
    feed: Vec<PriceRecord>,
    local: Vec<price_report::Model>,
) -> Vec<PriceRecord> {
    let mut combined: HashMap<String, PriceRecord> = HashMap::new();

    for record in feed {
        combined.insert(record.product_name.to_lowercase(), record);
    }

    for report in local {
        let key = report.product_name.to_lowercase();
        let record = PriceRecord {
            product_name: report.product_name,
            price: report.price,
            unit: report.unit,
            market_location: report.market_location,
            date_recorded: report.date_reported,
            source: "Crowdsourced".to_string(),
            currency: "UGX".to_string(),
        };
        match combined.get(&key) {
            Some(existing) if existing.date_recorded >= record.date_recorded => {}
            _ => {
                combined.insert(key, record);
            }
        }
    }

    let mut merged: Vec<PriceRecord> = combined.into_values().collect();
    merged.sort_by(|a, b| a.product_name.to_lowercase().cmp(&b.product_name.to_lowercase()));
    merged
}

/// Combined view served to users: whatever the feed has right now (possibly
/// nothing, if it is down) plus every local report.
pub async fn combined_prices(
    db: &DatabaseConnection,
    feed: &dyn PriceFeed,
    days_back: i64,
) -> Result<Vec<PriceRecord>, ApiError> {
    let feed_records = feed.fetch_latest(days_back).await;
    let local = PriceReportEntity::find()
        .order_by_desc(price_report::Column::DateReported)
        .all(db)
        .await?;
    Ok(combine_price_sources(feed_records, local))
}

#[derive(Deserialize, Validate, Debug)]
pub struct PriceReportPayload {
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    pub price: f64,
    #[validate(length(min = 1, max = 20))]
    pub unit: String,
    #[validate(length(min = 1, max = 100))]
    pub market_location: String,
}

pub async fn submit_report(
    db: &DatabaseConnection,
    reporter_id: i32,
    payload: PriceReportPayload,
) -> Result<price_report::Model, ApiError> {
    payload.validate()?;

    if payload.price <= 0.0 {
        return Err(ApiError::Validation(
            "Price must be greater than 0".to_string(),
        ));
    }

    let now = Utc::now();
    let row = price_report::ActiveModel {
        reporter_id: Set(reporter_id),
        product_name: Set(payload.product_name),
        price: Set(payload.price),
        unit: Set(payload.unit),
        market_location: Set(payload.market_location),
        date_reported: Set(now.date_naive()),
        created_at: Set(now),
        ..Default::default()
    };
    let created = row.insert(db).await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn feed_record(name: &str, price: f64, date: NaiveDate) -> PriceRecord {
        PriceRecord {
            product_name: name.to_string(),
            price,
            unit: "kg".to_string(),
            market_location: "Owino Market".to_string(),
            date_recorded: date,
            source: "WFP API".to_string(),
            currency: "UGX".to_string(),
        }
    }

    fn local_report(name: &str, price: f64, date: NaiveDate) -> price_report::Model {
        price_report::Model {
            id: 0,
            reporter_id: 1,
            product_name: name.to_string(),
            price,
            unit: "kg".to_string(),
            market_location: "Nakasero".to_string(),
            date_reported: date,
            created_at: chrono::Utc::now(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn match_is_case_insensitive_and_newest_wins() {
        let feed = vec![feed_record("Maize", 1200.0, day(2026, 8, 1))];
        let local = vec![local_report("maize", 1500.0, day(2026, 8, 10))];

        let merged = combine_price_sources(feed, local);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].price, 1500.0);
        assert_eq!(merged[0].source, "Crowdsourced");
    }

    #[test]
    fn feed_wins_when_newer_or_tied() {
        let feed = vec![
            feed_record("Beans", 3000.0, day(2026, 8, 20)),
            feed_record("Rice", 4000.0, day(2026, 8, 15)),
        ];
        let local = vec![
            local_report("beans", 2800.0, day(2026, 8, 5)),
            local_report("rice", 4200.0, day(2026, 8, 15)),
        ];

        let merged = combine_price_sources(feed, local);
        assert_eq!(merged.len(), 2);
        let beans = merged.iter().find(|r| r.product_name == "Beans").unwrap();
        assert_eq!(beans.source, "WFP API");
        let rice = merged.iter().find(|r| r.product_name == "Rice").unwrap();
        assert_eq!(rice.source, "WFP API");
    }

    #[test]
    fn products_from_only_one_source_are_kept() {
        let feed = vec![feed_record("Maize", 1200.0, day(2026, 8, 1))];
        let local = vec![local_report("Matooke", 8000.0, day(2026, 8, 2))];

        let merged = combine_price_sources(feed, local);
        assert_eq!(merged.len(), 2);
    }
}
