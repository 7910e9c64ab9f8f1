use chrono::Utc;
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use validator::Validate;

use crate::entities::listing::{self, Entity as ListingEntity, ListingStatus};
use crate::entities::notification::NotificationKind;
use crate::entities::order::{self, Entity as OrderEntity, OrderStatus};
use crate::entities::order_item::{self, Entity as OrderItemEntity};
use crate::error::ApiError;
use crate::services::notify::notify;

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct DeliveryInfo {
    #[validate(length(min = 1))]
    pub delivery_address: String,
    #[validate(length(min = 1, max = 15))]
    pub delivery_phone: String,
    #[serde(default)]
    pub notes: String,
}

const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Place an order for `quantity` units of a listing. Stock is taken with a
/// conditional decrement so two buyers cannot both win the last unit; the
/// decrement, the status flip and the order rows all commit together.
pub async fn place_order(
    db: &DatabaseConnection,
    buyer_id: i32,
    listing_id: i32,
    quantity: i32,
    delivery: DeliveryInfo,
) -> Result<order::Model, ApiError> {
    delivery.validate()?;

    if quantity <= 0 {
        return Err(ApiError::Validation(
            "Quantity must be greater than 0".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let item_listing = ListingEntity::find_by_id(listing_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No listing with {} id was found", listing_id)))?;

    if item_listing.owner_id == buyer_id {
        return Err(ApiError::Validation(
            "You cannot order your own listing".to_string(),
        ));
    }
    if item_listing.status != ListingStatus::Available {
        return Err(ApiError::Validation(
            "This listing is not available".to_string(),
        ));
    }

    // Conditional decrement: zero rows touched means someone else took the
    // stock first, or there was never enough.
    let decrement = ListingEntity::update_many()
        .col_expr(
            listing::Column::Quantity,
            Expr::col(listing::Column::Quantity).sub(quantity),
        )
        .filter(listing::Column::Id.eq(listing_id))
        .filter(listing::Column::Quantity.gte(quantity))
        .exec(&txn)
        .await?;
    if decrement.rows_affected == 0 {
        return Err(ApiError::Validation(format!(
            "Only {} {} available",
            item_listing.quantity, item_listing.unit
        )));
    }

    let remaining = ListingEntity::find_by_id(listing_id)
        .one(&txn)
        .await?
        .ok_or(ApiError::Internal)?;
    if remaining.quantity == 0 {
        let mut out: listing::ActiveModel = remaining.into();
        out.status = Set(ListingStatus::OutOfStock);
        out.update(&txn).await?;
    }

    let unit_price = item_listing.price;
    let total_amount = quantity as f64 * unit_price;
    let order_number = unique_order_number(&txn).await?;
    let now = Utc::now();

    let new_order = order::ActiveModel {
        buyer_id: Set(buyer_id),
        farmer_id: Set(item_listing.owner_id),
        order_number: Set(order_number),
        status: Set(OrderStatus::Pending),
        total_amount: Set(total_amount),
        delivery_address: Set(delivery.delivery_address),
        delivery_phone: Set(delivery.delivery_phone),
        notes: Set(delivery.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_order.insert(&txn).await?;

    let item = order_item::ActiveModel {
        order_id: Set(created.id),
        listing_id: Set(listing_id),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        subtotal: Set(quantity as f64 * unit_price),
        created_at: Set(now),
        ..Default::default()
    };
    item.insert(&txn).await?;

    txn.commit().await?;

    notify(
        db,
        created.farmer_id,
        NotificationKind::Order,
        "New order received",
        &format!(
            "Order {} for {} x {}",
            created.order_number, quantity, item_listing.name
        ),
        Some(format!("/api/order/{}", created.id)),
    )
    .await;

    Ok(created)
}

/// Farmer-driven status update, restricted to the forward transition graph.
/// Cancelling edges put every line item's quantity back on its listing, just
/// like a buyer cancellation.
pub async fn update_status(
    db: &DatabaseConnection,
    order_id: i32,
    actor_id: i32,
    new_status: &str,
) -> Result<order::Model, ApiError> {
    let existing = find_order(db, order_id).await?;

    if existing.farmer_id != actor_id {
        return Err(ApiError::Permission(
            "Only the farmer can update order status".to_string(),
        ));
    }

    let next: OrderStatus = new_status
        .parse()
        .map_err(|err: String| ApiError::Validation(err))?;

    if !existing.status.can_transition_to(next) {
        return Err(ApiError::InvalidState(format!(
            "Cannot move order from {} to {}",
            existing.status, next
        )));
    }

    let txn = db.begin().await?;

    if next == OrderStatus::Cancelled {
        restore_stock(&txn, order_id).await?;
    }

    let buyer_id = existing.buyer_id;
    let order_number = existing.order_number.clone();
    let mut row: order::ActiveModel = existing.into();
    row.status = Set(next);
    row.updated_at = Set(Utc::now());
    let updated = row.update(&txn).await?;

    txn.commit().await?;

    notify(
        db,
        buyer_id,
        NotificationKind::Order,
        "Order status updated",
        &format!("Order {} is now {}", order_number, next),
        Some(format!("/api/order/{}", order_id)),
    )
    .await;

    Ok(updated)
}

/// Buyer-only cancellation of a still-pending order. Every line item's
/// quantity goes back onto its listing in the same transaction.
pub async fn cancel_order(
    db: &DatabaseConnection,
    order_id: i32,
    actor_id: i32,
) -> Result<order::Model, ApiError> {
    let txn = db.begin().await?;

    let existing = OrderEntity::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No order with {} id was found", order_id)))?;

    if existing.buyer_id != actor_id {
        return Err(ApiError::Permission(
            "You can only cancel your own orders".to_string(),
        ));
    }
    if existing.status != OrderStatus::Pending {
        return Err(ApiError::InvalidState(format!(
            "Cannot cancel order with status: {}",
            existing.status
        )));
    }

    restore_stock(&txn, order_id).await?;

    let farmer_id = existing.farmer_id;
    let order_number = existing.order_number.clone();
    let mut row: order::ActiveModel = existing.into();
    row.status = Set(OrderStatus::Cancelled);
    row.updated_at = Set(Utc::now());
    let cancelled = row.update(&txn).await?;

    txn.commit().await?;

    notify(
        db,
        farmer_id,
        NotificationKind::Order,
        "Order cancelled",
        &format!("Order {} was cancelled by the buyer", order_number),
        Some(format!("/api/order/{}", order_id)),
    )
    .await;

    Ok(cancelled)
}

/// Order with its line items; visible to the two parties only.
pub async fn order_detail(
    db: &DatabaseConnection,
    order_id: i32,
    actor_id: i32,
) -> Result<(order::Model, Vec<order_item::Model>), ApiError> {
    let existing = find_order(db, order_id).await?;

    if existing.buyer_id != actor_id && existing.farmer_id != actor_id {
        return Err(ApiError::Permission(
            "You do not have permission to view this order".to_string(),
        ));
    }

    let items = OrderItemEntity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(db)
        .await?;

    Ok((existing, items))
}

/// Orders placed (as buyer) and received (as farmer) for one account.
pub async fn my_orders(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<(Vec<order::Model>, Vec<order::Model>), ApiError> {
    let placed = OrderEntity::find()
        .filter(order::Column::BuyerId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await?;
    let received = OrderEntity::find()
        .filter(order::Column::FarmerId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await?;
    Ok((placed, received))
}

/// Put every line item's quantity back on its listing, flipping out-of-stock
/// listings back to available. Runs inside the caller's transaction.
async fn restore_stock<C: ConnectionTrait>(conn: &C, order_id: i32) -> Result<(), ApiError> {
    let items = OrderItemEntity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(conn)
        .await?;

    for item in &items {
        let restored = ListingEntity::find_by_id(item.listing_id)
            .one(conn)
            .await?
            .ok_or(ApiError::Internal)?;
        let was_out_of_stock = restored.status == ListingStatus::OutOfStock;
        let new_quantity = restored.quantity + item.quantity;

        let mut row: listing::ActiveModel = restored.into();
        row.quantity = Set(new_quantity);
        if was_out_of_stock {
            row.status = Set(ListingStatus::Available);
        }
        row.update(conn).await?;
    }

    Ok(())
}

pub async fn find_order(
    db: &DatabaseConnection,
    order_id: i32,
) -> Result<order::Model, ApiError> {
    OrderEntity::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No order with {} id was found", order_id)))
}

/// Date-stamped number with a random suffix, regenerated on collision.
async fn unique_order_number<C: ConnectionTrait>(conn: &C) -> Result<String, ApiError> {
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let candidate = generate_order_number();
        let taken = OrderEntity::find()
            .filter(order::Column::OrderNumber.eq(&candidate))
            .one(conn)
            .await?;
        if taken.is_none() {
            return Ok(candidate);
        }
    }
    Err(ApiError::Internal)
}

fn generate_order_number() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("ORD-{}-{}", Utc::now().format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::generate_order_number;

    #[test]
    fn order_number_has_expected_shape() {
        let number = generate_order_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
