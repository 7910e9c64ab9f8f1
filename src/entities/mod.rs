pub mod category;
pub mod farmer_profile;
pub mod group_buy_participant;
pub mod group_buy_pool;
pub mod listing;
pub mod notification;
pub mod order;
pub mod order_item;
pub mod price_report;
pub mod review;
pub mod review_response;
pub mod supplier_profile;
pub mod user;

use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Schema, Set};

/// Create every table from its entity definition. Safe to call on a fresh
/// database only.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    let statements: Vec<TableCreateStatement> = vec![
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(farmer_profile::Entity),
        schema.create_table_from_entity(supplier_profile::Entity),
        schema.create_table_from_entity(category::Entity),
        schema.create_table_from_entity(listing::Entity),
        schema.create_table_from_entity(order::Entity),
        schema.create_table_from_entity(order_item::Entity),
        schema.create_table_from_entity(group_buy_pool::Entity),
        schema.create_table_from_entity(group_buy_participant::Entity),
        schema.create_table_from_entity(review::Entity),
        schema.create_table_from_entity(review_response::Entity),
        schema.create_table_from_entity(price_report::Entity),
        schema.create_table_from_entity(notification::Entity),
    ];

    for statement in statements {
        db.execute(db.get_database_backend().build(&statement)).await?;
    }

    Ok(())
}

/// Seed the default category set on first boot. Does nothing when categories
/// already exist.
pub async fn primary_setup(db: &DatabaseConnection) -> Result<(), DbErr> {
    if category::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let defaults = [
        ("Vegetables", "Fresh vegetables and greens"),
        ("Fruits", "Fresh fruits"),
        ("Cereals", "Maize, rice, millet and other grains"),
        ("Legumes", "Beans, groundnuts and pulses"),
        ("Seeds", "Planting seeds"),
        ("Fertilizers", "Organic and inorganic fertilizers"),
        ("Pesticides", "Crop protection products"),
        ("Tools", "Tools and equipment"),
    ];

    let rows = defaults.map(|(name, description)| category::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        ..Default::default()
    });

    category::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}
