#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use agrimarket::entities::{category, listing, setup_schema, user};
use agrimarket::services::orders::DeliveryInfo;

/// Fresh in-memory database with the full schema. One pooled connection so
/// every query sees the same sqlite instance.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    setup_schema(&db).await.expect("Failed to create schema");
    db
}

pub async fn create_user(db: &DatabaseConnection, username: &str, role: user::Role) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        // Not a real hash; password checks are not exercised here.
        password: Set("test-hash".to_string()),
        role: Set(role),
        phone: Set("0700000000".to_string()),
        location: Set("Kampala".to_string()),
        is_verified: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

pub async fn create_category(db: &DatabaseConnection, name: &str) -> category::Model {
    category::ActiveModel {
        name: Set(name.to_string()),
        description: Set(String::new()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert category")
}

pub async fn create_listing(
    db: &DatabaseConnection,
    owner_id: i32,
    category_id: i32,
    kind: listing::ListingKind,
    quantity: i32,
    price: f64,
) -> listing::Model {
    let status = if quantity == 0 {
        listing::ListingStatus::OutOfStock
    } else {
        listing::ListingStatus::Available
    };
    listing::ActiveModel {
        owner_id: Set(owner_id),
        category_id: Set(category_id),
        kind: Set(kind),
        name: Set("Fresh Matooke".to_string()),
        description: Set(String::new()),
        price: Set(price),
        quantity: Set(quantity),
        unit: Set("kg".to_string()),
        location: Set("Kampala".to_string()),
        status: Set(status),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert listing")
}

pub fn delivery() -> DeliveryInfo {
    DeliveryInfo {
        delivery_address: "Plot 12, Kampala Road".to_string(),
        delivery_phone: "0700000001".to_string(),
        notes: String::new(),
    }
}
