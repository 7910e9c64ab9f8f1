use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use validator::Validate;

use crate::entities::category::{self, Entity as CategoryEntity};
use crate::entities::listing::{self, Entity as ListingEntity, ListingKind, ListingStatus};
use crate::entities::user::Role;
use crate::error::ApiError;
use crate::services::identity::require_user;

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct NewListing {
    pub category_id: i32,
    pub kind: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    #[validate(length(min = 1, max = 20))]
    pub unit: String,
    #[serde(default)]
    pub location: String,
}

/// Create a listing. Farmers list produce, suppliers list inputs; anyone
/// else is refused.
pub async fn create_listing(
    db: &DatabaseConnection,
    owner_id: i32,
    payload: NewListing,
) -> Result<listing::Model, ApiError> {
    payload.validate()?;

    let kind = match payload.kind.as_str() {
        "produce" => ListingKind::Produce,
        "input" => ListingKind::Input,
        other => {
            return Err(ApiError::Validation(format!(
                "Invalid listing kind: {}",
                other
            )))
        }
    };

    let owner = require_user(db, owner_id).await?;
    match (kind, owner.role) {
        (ListingKind::Produce, Role::Farmer) => {}
        (ListingKind::Input, Role::Supplier) => {}
        (ListingKind::Produce, _) => {
            return Err(ApiError::Permission(
                "Only farmers can list produce".to_string(),
            ))
        }
        (ListingKind::Input, _) => {
            return Err(ApiError::Permission(
                "Only suppliers can list agricultural inputs".to_string(),
            ))
        }
    }

    if payload.price <= 0.0 {
        return Err(ApiError::Validation(
            "Price must be greater than 0".to_string(),
        ));
    }
    if payload.quantity < 0 {
        return Err(ApiError::Validation(
            "Quantity cannot be negative".to_string(),
        ));
    }

    CategoryEntity::find_by_id(payload.category_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::Validation(format!(
                "No category with {} id was found",
                payload.category_id
            ))
        })?;

    let status = derive_status(payload.quantity);
    let row = listing::ActiveModel {
        owner_id: Set(owner_id),
        category_id: Set(payload.category_id),
        kind: Set(kind),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        quantity: Set(payload.quantity),
        unit: Set(payload.unit),
        location: Set(payload.location),
        status: Set(status),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = row.insert(db).await?;
    Ok(created)
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct ListingEdit {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    pub location: Option<String>,
}

/// Owner-only edit. Changing the quantity re-derives the available /
/// out-of-stock status unless the listing was discontinued.
pub async fn update_listing(
    db: &DatabaseConnection,
    listing_id: i32,
    actor_id: i32,
    edit: ListingEdit,
) -> Result<listing::Model, ApiError> {
    edit.validate()?;

    let existing = find_listing(db, listing_id).await?;
    if existing.owner_id != actor_id {
        return Err(ApiError::Permission(
            "Only the owner can edit this listing".to_string(),
        ));
    }

    if let Some(price) = edit.price {
        if price <= 0.0 {
            return Err(ApiError::Validation(
                "Price must be greater than 0".to_string(),
            ));
        }
    }
    if let Some(quantity) = edit.quantity {
        if quantity < 0 {
            return Err(ApiError::Validation(
                "Quantity cannot be negative".to_string(),
            ));
        }
    }

    let discontinued = existing.status == ListingStatus::Discontinued;
    let mut row: listing::ActiveModel = existing.into();
    if let Some(name) = edit.name {
        row.name = Set(name);
    }
    if let Some(description) = edit.description {
        row.description = Set(description);
    }
    if let Some(price) = edit.price {
        row.price = Set(price);
    }
    if let Some(quantity) = edit.quantity {
        row.quantity = Set(quantity);
        if !discontinued {
            row.status = Set(derive_status(quantity));
        }
    }
    if let Some(unit) = edit.unit {
        row.unit = Set(unit);
    }
    if let Some(location) = edit.location {
        row.location = Set(location);
    }

    let updated = row.update(db).await?;
    Ok(updated)
}

/// Manual status override taking the listing off the market for good.
pub async fn discontinue_listing(
    db: &DatabaseConnection,
    listing_id: i32,
    actor_id: i32,
) -> Result<listing::Model, ApiError> {
    let existing = find_listing(db, listing_id).await?;
    if existing.owner_id != actor_id {
        return Err(ApiError::Permission(
            "Only the owner can discontinue this listing".to_string(),
        ));
    }

    let mut row: listing::ActiveModel = existing.into();
    row.status = Set(ListingStatus::Discontinued);
    let updated = row.update(db).await?;
    Ok(updated)
}

#[derive(Deserialize, Debug, Default)]
pub struct BrowseFilter {
    pub kind: Option<String>,
    pub category: Option<i32>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Public browse over available listings.
pub async fn browse_listings(
    db: &DatabaseConnection,
    filter: BrowseFilter,
) -> Result<Vec<listing::Model>, ApiError> {
    let mut query =
        ListingEntity::find().filter(listing::Column::Status.eq(ListingStatus::Available));

    if let Some(kind) = filter.kind.as_deref() {
        let kind = match kind {
            "produce" => ListingKind::Produce,
            "input" => ListingKind::Input,
            other => {
                return Err(ApiError::Validation(format!(
                    "Invalid listing kind: {}",
                    other
                )))
            }
        };
        query = query.filter(listing::Column::Kind.eq(kind));
    }
    if let Some(category_id) = filter.category {
        query = query.filter(listing::Column::CategoryId.eq(category_id));
    }
    if let Some(min) = filter.min {
        query = query.filter(listing::Column::Price.gte(min));
    }
    if let Some(max) = filter.max {
        query = query.filter(listing::Column::Price.lte(max));
    }

    let rows = query
        .order_by_desc(listing::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn find_listing(
    db: &DatabaseConnection,
    listing_id: i32,
) -> Result<listing::Model, ApiError> {
    ListingEntity::find_by_id(listing_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No listing with {} id was found", listing_id)))
}

pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>, ApiError> {
    let rows = CategoryEntity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;
    Ok(rows)
}

fn derive_status(quantity: i32) -> ListingStatus {
    if quantity == 0 {
        ListingStatus::OutOfStock
    } else {
        ListingStatus::Available
    }
}
