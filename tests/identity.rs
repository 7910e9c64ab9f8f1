mod common;

use agrimarket::entities::farmer_profile::{self, Entity as FarmerProfileEntity};
use agrimarket::entities::user::Role;
use agrimarket::error::ApiError;
use agrimarket::services::identity::{self, RegisterPayload};
use common::setup_db;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

fn payload(username: &str, role: &str) -> RegisterPayload {
    RegisterPayload {
        username: username.to_string(),
        password: "correct-horse-battery".to_string(),
        role: role.to_string(),
        phone: "0700000000".to_string(),
        location: "Kampala".to_string(),
        farm_name: Some("Green Valley Farm".to_string()),
        farm_size_acres: Some(4.5),
        company_name: None,
        business_license: None,
        specialization: None,
    }
}

#[tokio::test]
async fn registering_a_farmer_creates_the_profile_row() {
    let db = setup_db().await;

    let created = identity::register(&db, payload("nakato", "farmer"))
        .await
        .unwrap();
    assert_eq!(created.role, Role::Farmer);

    let profile = FarmerProfileEntity::find()
        .filter(farmer_profile::Column::UserId.eq(created.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.farm_name, "Green Valley Farm");
    assert_eq!(profile.rating_average, 0.0);
    assert_eq!(profile.total_sales, 0);
}

#[tokio::test]
async fn duplicate_usernames_are_a_conflict_not_a_server_error() {
    let db = setup_db().await;

    identity::register(&db, payload("nakato", "farmer"))
        .await
        .unwrap();

    let again = identity::register(&db, payload("nakato", "consumer")).await;
    assert!(matches!(again, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn unknown_roles_are_rejected_at_parse_time() {
    let db = setup_db().await;

    let refused = identity::register(&db, payload("nakato", "admin")).await;
    assert!(matches!(refused, Err(ApiError::Validation(_))));
}
