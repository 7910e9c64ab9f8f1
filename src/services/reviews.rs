use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::farmer_profile::{self, Entity as FarmerProfileEntity};
use crate::entities::notification::NotificationKind;
use crate::entities::order::{Entity as OrderEntity, OrderStatus};
use crate::entities::order;
use crate::entities::review::{self, Entity as ReviewEntity};
use crate::entities::review_response::{self, Entity as ReviewResponseEntity};
use crate::error::ApiError;
use crate::services::notify::notify;

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct ReviewPayload {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(range(min = 1, max = 5))]
    pub product_quality: i32,
    #[validate(range(min = 1, max = 5))]
    pub communication: i32,
    #[validate(range(min = 1, max = 5))]
    pub delivery_speed: i32,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "default_true")]
    pub would_recommend: bool,
}

fn default_true() -> bool {
    true
}

/// Record a review for a completed order and re-aggregate the farmer's
/// rating. The rollup is a full recomputation over all of the farmer's
/// reviews, not a running average.
pub async fn record_review(
    db: &DatabaseConnection,
    order_id: i32,
    reviewer_id: i32,
    payload: ReviewPayload,
) -> Result<review::Model, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;

    let reviewed_order = OrderEntity::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No order with {} id was found", order_id)))?;

    if reviewed_order.buyer_id != reviewer_id {
        return Err(ApiError::Permission(
            "You can only review your own orders".to_string(),
        ));
    }
    if reviewed_order.status != OrderStatus::Completed {
        return Err(ApiError::Validation(
            "You can only review completed orders".to_string(),
        ));
    }

    let existing = ReviewEntity::find()
        .filter(review::Column::OrderId.eq(order_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "You have already reviewed this order".to_string(),
        ));
    }

    let farmer_id = reviewed_order.farmer_id;
    let row = review::ActiveModel {
        order_id: Set(order_id),
        reviewer_id: Set(reviewer_id),
        farmer_id: Set(farmer_id),
        rating: Set(payload.rating),
        product_quality: Set(payload.product_quality),
        communication: Set(payload.communication),
        delivery_speed: Set(payload.delivery_speed),
        comment: Set(payload.comment),
        would_recommend: Set(payload.would_recommend),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = row.insert(&txn).await?;

    // Full re-aggregation onto the profile. Farmers without a profile row
    // simply skip the rollup.
    let ratings: Vec<i32> = ReviewEntity::find()
        .filter(review::Column::FarmerId.eq(farmer_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();

    if let Some(profile) = FarmerProfileEntity::find()
        .filter(farmer_profile::Column::UserId.eq(farmer_id))
        .one(&txn)
        .await?
    {
        let average = ratings.iter().sum::<i32>() as f64 / ratings.len() as f64;
        let completed_sales = OrderEntity::find()
            .filter(order::Column::FarmerId.eq(farmer_id))
            .filter(order::Column::Status.eq(OrderStatus::Completed))
            .count(&txn)
            .await?;

        let mut profile: farmer_profile::ActiveModel = profile.into();
        profile.rating_average = Set(round2(average));
        profile.total_sales = Set(completed_sales as i32);
        profile.update(&txn).await?;
    }

    txn.commit().await?;

    notify(
        db,
        farmer_id,
        NotificationKind::Review,
        "New review received",
        &format!("You received a {}-star review", created.rating),
        Some(format!("/api/farmer/{}/reviews", farmer_id)),
    )
    .await;

    Ok(created)
}

/// Farmer-authored reply, at most one per review.
pub async fn respond_to_review(
    db: &DatabaseConnection,
    review_id: i32,
    actor_id: i32,
    response_text: String,
) -> Result<review_response::Model, ApiError> {
    let reviewed = ReviewEntity::find_by_id(review_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No review with {} id was found", review_id)))?;

    if reviewed.farmer_id != actor_id {
        return Err(ApiError::Permission(
            "Only the reviewed farmer can respond".to_string(),
        ));
    }

    let existing = ReviewResponseEntity::find()
        .filter(review_response::Column::ReviewId.eq(review_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "You have already responded to this review".to_string(),
        ));
    }

    let row = review_response::ActiveModel {
        review_id: Set(review_id),
        response_text: Set(response_text),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = row.insert(db).await?;
    Ok(created)
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ReviewStats {
    pub total_reviews: u64,
    pub avg_rating: f64,
    pub avg_quality: f64,
    pub avg_communication: f64,
    pub avg_delivery: f64,
    pub recommend_percentage: f64,
}

/// All reviews for a farmer plus the aggregate figures shown on their page.
pub async fn farmer_reviews(
    db: &DatabaseConnection,
    farmer_id: i32,
) -> Result<(Vec<review::Model>, ReviewStats), ApiError> {
    let rows = ReviewEntity::find()
        .filter(review::Column::FarmerId.eq(farmer_id))
        .order_by_desc(review::Column::CreatedAt)
        .all(db)
        .await?;

    let total = rows.len() as u64;
    let stats = if total == 0 {
        ReviewStats {
            total_reviews: 0,
            avg_rating: 0.0,
            avg_quality: 0.0,
            avg_communication: 0.0,
            avg_delivery: 0.0,
            recommend_percentage: 0.0,
        }
    } else {
        let n = total as f64;
        let recommend = rows.iter().filter(|r| r.would_recommend).count() as f64;
        ReviewStats {
            total_reviews: total,
            avg_rating: round2(rows.iter().map(|r| r.rating).sum::<i32>() as f64 / n),
            avg_quality: round2(rows.iter().map(|r| r.product_quality).sum::<i32>() as f64 / n),
            avg_communication: round2(
                rows.iter().map(|r| r.communication).sum::<i32>() as f64 / n,
            ),
            avg_delivery: round2(rows.iter().map(|r| r.delivery_speed).sum::<i32>() as f64 / n),
            recommend_percentage: round2(recommend / n * 100.0),
        }
    };

    Ok((rows, stats))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(4.666666), 4.67);
        assert_eq!(round2(4.5), 4.5);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(3.333333), 3.33);
    }
}
