mod common;

use agrimarket::entities::group_buy_participant::{self, Entity as ParticipantEntity};
use agrimarket::entities::group_buy_pool::{Entity as PoolEntity, PoolStatus};
use agrimarket::entities::listing::ListingKind;
use agrimarket::entities::user::Role;
use agrimarket::error::ApiError;
use agrimarket::services::group_buy;
use chrono::{Duration, Utc};
use common::{create_category, create_listing, create_user, setup_db};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

#[tokio::test]
async fn creating_a_pool_registers_the_organizer_as_participant() {
    let db = setup_db().await;
    let supplier = create_user(&db, "ssebo", Role::Supplier).await;
    let organizer = create_user(&db, "nakato", Role::Farmer).await;
    let category = create_category(&db, "Fertilizers").await;
    let listing =
        create_listing(&db, supplier.id, category.id, ListingKind::Input, 500, 80.0).await;

    let pool = group_buy::create_pool(
        &db,
        organizer.id,
        listing.id,
        100,
        30,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();

    assert_eq!(pool.status, PoolStatus::Open);
    assert_eq!(pool.current_quantity, 30);

    let participants = ParticipantEntity::find()
        .filter(group_buy_participant::Column::PoolId.eq(pool.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].farmer_id, organizer.id);
    assert_eq!(participants[0].quantity, 30);
}

#[tokio::test]
async fn pools_are_only_created_on_input_listings() {
    let db = setup_db().await;
    let farmer = create_user(&db, "nakato", Role::Farmer).await;
    let category = create_category(&db, "Vegetables").await;
    let produce =
        create_listing(&db, farmer.id, category.id, ListingKind::Produce, 50, 500.0).await;

    let refused = group_buy::create_pool(
        &db,
        farmer.id,
        produce.id,
        100,
        30,
        Utc::now() + Duration::days(7),
    )
    .await;
    assert!(matches!(refused, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn reaching_the_target_closes_the_pool() {
    let db = setup_db().await;
    let supplier = create_user(&db, "ssebo", Role::Supplier).await;
    let organizer = create_user(&db, "nakato", Role::Farmer).await;
    let joiner = create_user(&db, "okello", Role::Farmer).await;
    let category = create_category(&db, "Fertilizers").await;
    let listing =
        create_listing(&db, supplier.id, category.id, ListingKind::Input, 500, 80.0).await;

    let pool = group_buy::create_pool(
        &db,
        organizer.id,
        listing.id,
        100,
        30,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();

    // 30 + 80 = 110 >= 100; overshoot is allowed and the pool closes.
    let updated = group_buy::join_pool(&db, pool.id, joiner.id, 80).await.unwrap();
    assert_eq!(updated.current_quantity, 110);
    assert_eq!(updated.status, PoolStatus::Closed);
}

#[tokio::test]
async fn current_quantity_always_equals_the_participant_sum() {
    let db = setup_db().await;
    let supplier = create_user(&db, "ssebo", Role::Supplier).await;
    let organizer = create_user(&db, "nakato", Role::Farmer).await;
    let second = create_user(&db, "okello", Role::Farmer).await;
    let third = create_user(&db, "mukasa", Role::Farmer).await;
    let category = create_category(&db, "Seeds").await;
    let listing =
        create_listing(&db, supplier.id, category.id, ListingKind::Input, 500, 80.0).await;

    let pool = group_buy::create_pool(
        &db,
        organizer.id,
        listing.id,
        200,
        40,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();
    group_buy::join_pool(&db, pool.id, second.id, 25).await.unwrap();
    group_buy::join_pool(&db, pool.id, third.id, 35).await.unwrap();

    let (pool, participants) = group_buy::pool_detail(&db, pool.id).await.unwrap();
    let sum: i32 = participants.iter().map(|p| p.quantity).sum();
    assert_eq!(pool.current_quantity, sum);
    assert_eq!(pool.current_quantity, 100);
    assert_eq!(pool.status, PoolStatus::Open);
}

#[tokio::test]
async fn joining_twice_is_a_conflict() {
    let db = setup_db().await;
    let supplier = create_user(&db, "ssebo", Role::Supplier).await;
    let organizer = create_user(&db, "nakato", Role::Farmer).await;
    let joiner = create_user(&db, "okello", Role::Farmer).await;
    let category = create_category(&db, "Seeds").await;
    let listing =
        create_listing(&db, supplier.id, category.id, ListingKind::Input, 500, 80.0).await;

    let pool = group_buy::create_pool(
        &db,
        organizer.id,
        listing.id,
        200,
        40,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();
    group_buy::join_pool(&db, pool.id, joiner.id, 25).await.unwrap();

    let again = group_buy::join_pool(&db, pool.id, joiner.id, 10).await;
    assert!(matches!(again, Err(ApiError::Conflict(_))));

    // The organizer already has a row too.
    let organizer_again = group_buy::join_pool(&db, pool.id, organizer.id, 10).await;
    assert!(matches!(organizer_again, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn closed_and_expired_pools_cannot_be_joined() {
    let db = setup_db().await;
    let supplier = create_user(&db, "ssebo", Role::Supplier).await;
    let organizer = create_user(&db, "nakato", Role::Farmer).await;
    let joiner = create_user(&db, "okello", Role::Farmer).await;
    let late = create_user(&db, "mukasa", Role::Farmer).await;
    let category = create_category(&db, "Seeds").await;
    let listing =
        create_listing(&db, supplier.id, category.id, ListingKind::Input, 500, 80.0).await;

    let pool = group_buy::create_pool(
        &db,
        organizer.id,
        listing.id,
        50,
        30,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();
    group_buy::join_pool(&db, pool.id, joiner.id, 30).await.unwrap();

    let closed = group_buy::join_pool(&db, pool.id, late.id, 5).await;
    assert!(matches!(closed, Err(ApiError::InvalidState(_))));

    // An open pool whose deadline has passed also refuses joins.
    let expired = group_buy::create_pool(
        &db,
        organizer.id,
        listing.id,
        50,
        10,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();
    let row = PoolEntity::find_by_id(expired.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut row: agrimarket::entities::group_buy_pool::ActiveModel = row.into();
    row.deadline = Set(Utc::now() - Duration::hours(1));
    row.update(&db).await.unwrap();

    let too_late = group_buy::join_pool(&db, expired.id, late.id, 5).await;
    assert!(matches!(too_late, Err(ApiError::InvalidState(_))));
}

#[tokio::test]
async fn expired_open_pools_are_hidden_but_not_cancelled() {
    let db = setup_db().await;
    let supplier = create_user(&db, "ssebo", Role::Supplier).await;
    let organizer = create_user(&db, "nakato", Role::Farmer).await;
    let category = create_category(&db, "Seeds").await;
    let listing =
        create_listing(&db, supplier.id, category.id, ListingKind::Input, 500, 80.0).await;

    let pool = group_buy::create_pool(
        &db,
        organizer.id,
        listing.id,
        100,
        10,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();

    let open = group_buy::list_open_pools(&db).await.unwrap();
    assert_eq!(open.len(), 1);

    let row = PoolEntity::find_by_id(pool.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut row: agrimarket::entities::group_buy_pool::ActiveModel = row.into();
    row.deadline = Set(Utc::now() - Duration::hours(1));
    row.update(&db).await.unwrap();

    // Expiry is a read-time filter; the stored status stays open.
    let open = group_buy::list_open_pools(&db).await.unwrap();
    assert!(open.is_empty());
    let stored = PoolEntity::find_by_id(pool.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PoolStatus::Open);
}

#[tokio::test]
async fn a_pool_at_its_deadline_is_neither_listed_nor_joinable() {
    let db = setup_db().await;
    let supplier = create_user(&db, "ssebo", Role::Supplier).await;
    let organizer = create_user(&db, "nakato", Role::Farmer).await;
    let joiner = create_user(&db, "okello", Role::Farmer).await;
    let category = create_category(&db, "Seeds").await;
    let listing =
        create_listing(&db, supplier.id, category.id, ListingKind::Input, 500, 80.0).await;

    let pool = group_buy::create_pool(
        &db,
        organizer.id,
        listing.id,
        100,
        10,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();

    // Pin the deadline to this instant; by query time it has passed, and the
    // listing filter and the join check must agree on that.
    let row = PoolEntity::find_by_id(pool.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut row: agrimarket::entities::group_buy_pool::ActiveModel = row.into();
    row.deadline = Set(Utc::now());
    row.update(&db).await.unwrap();

    let open = group_buy::list_open_pools(&db).await.unwrap();
    assert!(open.is_empty());
    let refused = group_buy::join_pool(&db, pool.id, joiner.id, 5).await;
    assert!(matches!(refused, Err(ApiError::InvalidState(_))));
}

#[tokio::test]
async fn organizer_transitions_cancel_and_complete() {
    let db = setup_db().await;
    let supplier = create_user(&db, "ssebo", Role::Supplier).await;
    let organizer = create_user(&db, "nakato", Role::Farmer).await;
    let joiner = create_user(&db, "okello", Role::Farmer).await;
    let category = create_category(&db, "Seeds").await;
    let listing =
        create_listing(&db, supplier.id, category.id, ListingKind::Input, 500, 80.0).await;

    // Manual cancel of an open pool; organizer only.
    let pool = group_buy::create_pool(
        &db,
        organizer.id,
        listing.id,
        100,
        10,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();
    let not_organizer = group_buy::cancel_pool(&db, pool.id, joiner.id).await;
    assert!(matches!(not_organizer, Err(ApiError::Permission(_))));
    let cancelled = group_buy::cancel_pool(&db, pool.id, organizer.id).await.unwrap();
    assert_eq!(cancelled.status, PoolStatus::Cancelled);

    // Complete only applies to closed pools.
    let pool = group_buy::create_pool(
        &db,
        organizer.id,
        listing.id,
        40,
        20,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();
    let still_open = group_buy::complete_pool(&db, pool.id, organizer.id).await;
    assert!(matches!(still_open, Err(ApiError::InvalidState(_))));

    group_buy::join_pool(&db, pool.id, joiner.id, 25).await.unwrap();
    let completed = group_buy::complete_pool(&db, pool.id, organizer.id).await.unwrap();
    assert_eq!(completed.status, PoolStatus::Completed);
}
