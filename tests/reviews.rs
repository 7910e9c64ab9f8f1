mod common;

use agrimarket::entities::farmer_profile::{self, Entity as FarmerProfileEntity};
use agrimarket::entities::listing::ListingKind;
use agrimarket::entities::user::Role;
use agrimarket::error::ApiError;
use agrimarket::services::orders;
use agrimarket::services::reviews::{self, ReviewPayload};
use common::{create_category, create_listing, create_user, delivery, setup_db};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

async fn create_farmer_profile(db: &DatabaseConnection, user_id: i32) -> farmer_profile::Model {
    farmer_profile::ActiveModel {
        user_id: Set(user_id),
        farm_name: Set("Green Valley Farm".to_string()),
        farm_size_acres: Set(4.5),
        specialization: Set("Horticulture".to_string()),
        rating_average: Set(0.0),
        total_sales: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert farmer profile")
}

fn payload(rating: i32) -> ReviewPayload {
    ReviewPayload {
        rating,
        product_quality: rating,
        communication: rating,
        delivery_speed: rating,
        comment: "Good produce, delivered on time".to_string(),
        would_recommend: true,
    }
}

/// Places an order and walks it through to completed.
async fn completed_order(
    db: &DatabaseConnection,
    buyer_id: i32,
    farmer_id: i32,
    listing_id: i32,
) -> i32 {
    let order = orders::place_order(db, buyer_id, listing_id, 1, delivery())
        .await
        .unwrap();
    orders::update_status(db, order.id, farmer_id, "confirmed")
        .await
        .unwrap();
    orders::update_status(db, order.id, farmer_id, "processing")
        .await
        .unwrap();
    orders::update_status(db, order.id, farmer_id, "completed")
        .await
        .unwrap();
    order.id
}

#[tokio::test]
async fn reviews_are_only_accepted_for_completed_orders() {
    let db = setup_db().await;
    let farmer = create_user(&db, "nakato", Role::Farmer).await;
    create_farmer_profile(&db, farmer.id).await;
    let buyer = create_user(&db, "okello", Role::Consumer).await;
    let category = create_category(&db, "Vegetables").await;
    let listing =
        create_listing(&db, farmer.id, category.id, ListingKind::Produce, 10, 500.0).await;

    let order = orders::place_order(&db, buyer.id, listing.id, 1, delivery())
        .await
        .unwrap();

    // Still pending.
    let early = reviews::record_review(&db, order.id, buyer.id, payload(5)).await;
    assert!(matches!(early, Err(ApiError::Validation(_))));

    orders::update_status(&db, order.id, farmer.id, "confirmed").await.unwrap();
    orders::update_status(&db, order.id, farmer.id, "processing").await.unwrap();
    orders::update_status(&db, order.id, farmer.id, "completed").await.unwrap();

    let review = reviews::record_review(&db, order.id, buyer.id, payload(5))
        .await
        .unwrap();
    assert_eq!(review.rating, 5);
    assert_eq!(review.farmer_id, farmer.id);

    let profile = FarmerProfileEntity::find()
        .filter(farmer_profile::Column::UserId.eq(farmer.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.rating_average, 5.0);
    assert_eq!(profile.total_sales, 1);
}

#[tokio::test]
async fn duplicate_reviews_are_a_conflict() {
    let db = setup_db().await;
    let farmer = create_user(&db, "nakato", Role::Farmer).await;
    create_farmer_profile(&db, farmer.id).await;
    let buyer = create_user(&db, "okello", Role::Consumer).await;
    let category = create_category(&db, "Vegetables").await;
    let listing =
        create_listing(&db, farmer.id, category.id, ListingKind::Produce, 10, 500.0).await;
    let order_id = completed_order(&db, buyer.id, farmer.id, listing.id).await;

    reviews::record_review(&db, order_id, buyer.id, payload(4))
        .await
        .unwrap();
    let again = reviews::record_review(&db, order_id, buyer.id, payload(2)).await;
    assert!(matches!(again, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn only_the_buyer_may_review_and_ratings_are_bounded() {
    let db = setup_db().await;
    let farmer = create_user(&db, "nakato", Role::Farmer).await;
    create_farmer_profile(&db, farmer.id).await;
    let buyer = create_user(&db, "okello", Role::Consumer).await;
    let stranger = create_user(&db, "mukasa", Role::Consumer).await;
    let category = create_category(&db, "Vegetables").await;
    let listing =
        create_listing(&db, farmer.id, category.id, ListingKind::Produce, 10, 500.0).await;
    let order_id = completed_order(&db, buyer.id, farmer.id, listing.id).await;

    let not_buyer = reviews::record_review(&db, order_id, stranger.id, payload(5)).await;
    assert!(matches!(not_buyer, Err(ApiError::Permission(_))));

    let out_of_range = reviews::record_review(&db, order_id, buyer.id, payload(6)).await;
    assert!(matches!(out_of_range, Err(ApiError::Validation(_))));
    let zero = reviews::record_review(&db, order_id, buyer.id, payload(0)).await;
    assert!(matches!(zero, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn rating_average_is_the_rounded_mean_and_stays_per_farmer() {
    let db = setup_db().await;
    let farmer = create_user(&db, "nakato", Role::Farmer).await;
    create_farmer_profile(&db, farmer.id).await;
    let other_farmer = create_user(&db, "ssali", Role::Farmer).await;
    let other_profile = create_farmer_profile(&db, other_farmer.id).await;
    let buyer_a = create_user(&db, "okello", Role::Consumer).await;
    let buyer_b = create_user(&db, "mukasa", Role::Consumer).await;
    let buyer_c = create_user(&db, "apio", Role::Consumer).await;
    let category = create_category(&db, "Vegetables").await;
    let listing =
        create_listing(&db, farmer.id, category.id, ListingKind::Produce, 10, 500.0).await;

    let order_a = completed_order(&db, buyer_a.id, farmer.id, listing.id).await;
    let order_b = completed_order(&db, buyer_b.id, farmer.id, listing.id).await;
    let order_c = completed_order(&db, buyer_c.id, farmer.id, listing.id).await;

    reviews::record_review(&db, order_a, buyer_a.id, payload(5)).await.unwrap();
    reviews::record_review(&db, order_b, buyer_b.id, payload(4)).await.unwrap();
    reviews::record_review(&db, order_c, buyer_c.id, payload(5)).await.unwrap();

    let profile = FarmerProfileEntity::find()
        .filter(farmer_profile::Column::UserId.eq(farmer.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    // mean(5, 4, 5) = 4.666... -> 4.67
    assert_eq!(profile.rating_average, 4.67);
    assert_eq!(profile.total_sales, 3);

    // The other farmer's rollup is untouched.
    let untouched = FarmerProfileEntity::find_by_id(other_profile.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.rating_average, 0.0);
    assert_eq!(untouched.total_sales, 0);
}

#[tokio::test]
async fn farmer_review_stats_aggregate_all_dimensions() {
    let db = setup_db().await;
    let farmer = create_user(&db, "nakato", Role::Farmer).await;
    create_farmer_profile(&db, farmer.id).await;
    let buyer_a = create_user(&db, "okello", Role::Consumer).await;
    let buyer_b = create_user(&db, "mukasa", Role::Consumer).await;
    let category = create_category(&db, "Vegetables").await;
    let listing =
        create_listing(&db, farmer.id, category.id, ListingKind::Produce, 10, 500.0).await;

    let order_a = completed_order(&db, buyer_a.id, farmer.id, listing.id).await;
    let order_b = completed_order(&db, buyer_b.id, farmer.id, listing.id).await;

    reviews::record_review(&db, order_a, buyer_a.id, payload(5)).await.unwrap();
    let mut low = payload(3);
    low.would_recommend = false;
    reviews::record_review(&db, order_b, buyer_b.id, low).await.unwrap();

    let (rows, stats) = reviews::farmer_reviews(&db, farmer.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(stats.total_reviews, 2);
    assert_eq!(stats.avg_rating, 4.0);
    assert_eq!(stats.recommend_percentage, 50.0);
}

#[tokio::test]
async fn one_farmer_response_per_review() {
    let db = setup_db().await;
    let farmer = create_user(&db, "nakato", Role::Farmer).await;
    create_farmer_profile(&db, farmer.id).await;
    let buyer = create_user(&db, "okello", Role::Consumer).await;
    let category = create_category(&db, "Vegetables").await;
    let listing =
        create_listing(&db, farmer.id, category.id, ListingKind::Produce, 10, 500.0).await;
    let order_id = completed_order(&db, buyer.id, farmer.id, listing.id).await;

    let review = reviews::record_review(&db, order_id, buyer.id, payload(4))
        .await
        .unwrap();

    let not_farmer =
        reviews::respond_to_review(&db, review.id, buyer.id, "thanks".to_string()).await;
    assert!(matches!(not_farmer, Err(ApiError::Permission(_))));

    reviews::respond_to_review(&db, review.id, farmer.id, "Thank you!".to_string())
        .await
        .unwrap();
    let again =
        reviews::respond_to_review(&db, review.id, farmer.id, "Again".to_string()).await;
    assert!(matches!(again, Err(ApiError::Conflict(_))));
}
