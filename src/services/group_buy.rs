use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::group_buy_participant::{self, Entity as ParticipantEntity};
use crate::entities::group_buy_pool::{self, Entity as PoolEntity, PoolStatus};
use crate::entities::listing::ListingKind;
use crate::entities::notification::NotificationKind;
use crate::error::ApiError;
use crate::services::catalog::find_listing;
use crate::services::notify::notify;

/// Open a pool on an input listing with the organizer as first participant.
pub async fn create_pool(
    db: &DatabaseConnection,
    organizer_id: i32,
    listing_id: i32,
    target_quantity: i32,
    my_quantity: i32,
    deadline: DateTime<Utc>,
) -> Result<group_buy_pool::Model, ApiError> {
    let item = find_listing(db, listing_id).await?;
    if item.kind != ListingKind::Input {
        return Err(ApiError::Validation(
            "Group buys are only available for agricultural inputs".to_string(),
        ));
    }
    if target_quantity <= 0 {
        return Err(ApiError::Validation(
            "Target quantity must be greater than 0".to_string(),
        ));
    }
    if my_quantity <= 0 {
        return Err(ApiError::Validation(
            "Quantity must be greater than 0".to_string(),
        ));
    }
    if deadline <= Utc::now() {
        return Err(ApiError::Validation(
            "Deadline must be in the future".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let pool = group_buy_pool::ActiveModel {
        listing_id: Set(listing_id),
        organizer_id: Set(organizer_id),
        target_quantity: Set(target_quantity),
        current_quantity: Set(my_quantity),
        status: Set(PoolStatus::Open),
        deadline: Set(deadline),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = pool.insert(&txn).await?;

    let participant = group_buy_participant::ActiveModel {
        pool_id: Set(created.id),
        farmer_id: Set(organizer_id),
        quantity: Set(my_quantity),
        joined_at: Set(Utc::now()),
        ..Default::default()
    };
    participant.insert(&txn).await?;

    txn.commit().await?;
    Ok(created)
}

/// Add a farmer's pledge. One row per farmer per pool; reaching the target
/// closes the pool. Overshooting the target is allowed.
pub async fn join_pool(
    db: &DatabaseConnection,
    pool_id: i32,
    farmer_id: i32,
    quantity: i32,
) -> Result<group_buy_pool::Model, ApiError> {
    if quantity <= 0 {
        return Err(ApiError::Validation(
            "Quantity must be greater than 0".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let pool = PoolEntity::find_by_id(pool_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No pool with {} id was found", pool_id)))?;

    if pool.status != PoolStatus::Open {
        return Err(ApiError::InvalidState(format!(
            "This pool is {}, not open for joining",
            pool.status
        )));
    }
    if pool.deadline <= Utc::now() {
        return Err(ApiError::InvalidState(
            "The deadline for this pool has passed".to_string(),
        ));
    }

    let already_joined = ParticipantEntity::find()
        .filter(group_buy_participant::Column::PoolId.eq(pool_id))
        .filter(group_buy_participant::Column::FarmerId.eq(farmer_id))
        .one(&txn)
        .await?;
    if already_joined.is_some() {
        return Err(ApiError::Conflict(
            "You have already joined this group buy".to_string(),
        ));
    }

    let participant = group_buy_participant::ActiveModel {
        pool_id: Set(pool_id),
        farmer_id: Set(farmer_id),
        quantity: Set(quantity),
        joined_at: Set(Utc::now()),
        ..Default::default()
    };
    participant.insert(&txn).await?;

    let organizer_id = pool.organizer_id;
    let target = pool.target_quantity;
    let new_quantity = pool.current_quantity + quantity;
    let target_reached = new_quantity >= target;

    let mut row: group_buy_pool::ActiveModel = pool.into();
    row.current_quantity = Set(new_quantity);
    if target_reached {
        row.status = Set(PoolStatus::Closed);
    }
    let updated = row.update(&txn).await?;

    txn.commit().await?;

    if target_reached {
        notify(
            db,
            organizer_id,
            NotificationKind::GroupBuy,
            "Group buy target reached",
            &format!("Your pool hit {} of {} units and is now closed", new_quantity, target),
            Some(format!("/api/pool/{}", pool_id)),
        )
        .await;
    }

    Ok(updated)
}

/// Pools still worth joining. Expiry is a read-time filter here, not a stored
/// transition; an expired pool keeps its `open` row but stops being listed.
pub async fn list_open_pools(
    db: &DatabaseConnection,
) -> Result<Vec<group_buy_pool::Model>, ApiError> {
    let rows = PoolEntity::find()
        .filter(group_buy_pool::Column::Status.eq(PoolStatus::Open))
        .filter(group_buy_pool::Column::Deadline.gt(Utc::now()))
        .order_by_asc(group_buy_pool::Column::Deadline)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn pool_detail(
    db: &DatabaseConnection,
    pool_id: i32,
) -> Result<(group_buy_pool::Model, Vec<group_buy_participant::Model>), ApiError> {
    let pool = PoolEntity::find_by_id(pool_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No pool with {} id was found", pool_id)))?;

    let participants = ParticipantEntity::find()
        .filter(group_buy_participant::Column::PoolId.eq(pool_id))
        .order_by_asc(group_buy_participant::Column::JoinedAt)
        .all(db)
        .await?;

    Ok((pool, participants))
}

/// Manual organizer transition: open -> cancelled.
pub async fn cancel_pool(
    db: &DatabaseConnection,
    pool_id: i32,
    actor_id: i32,
) -> Result<group_buy_pool::Model, ApiError> {
    transition_pool(db, pool_id, actor_id, PoolStatus::Open, PoolStatus::Cancelled).await
}

/// Administrative organizer transition once the bulk order has been placed:
/// closed -> completed.
pub async fn complete_pool(
    db: &DatabaseConnection,
    pool_id: i32,
    actor_id: i32,
) -> Result<group_buy_pool::Model, ApiError> {
    transition_pool(db, pool_id, actor_id, PoolStatus::Closed, PoolStatus::Completed).await
}

async fn transition_pool(
    db: &DatabaseConnection,
    pool_id: i32,
    actor_id: i32,
    from: PoolStatus,
    to: PoolStatus,
) -> Result<group_buy_pool::Model, ApiError> {
    let pool = PoolEntity::find_by_id(pool_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No pool with {} id was found", pool_id)))?;

    if pool.organizer_id != actor_id {
        return Err(ApiError::Permission(
            "Only the organizer can manage this pool".to_string(),
        ));
    }
    if pool.status != from {
        return Err(ApiError::InvalidState(format!(
            "Cannot move pool from {} to {}",
            pool.status, to
        )));
    }

    let mut row: group_buy_pool::ActiveModel = pool.into();
    row.status = Set(to);
    let updated = row.update(db).await?;
    Ok(updated)
}
