use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::services::catalog::{self, ListingEdit, NewListing};

pub fn listing_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/listing", post(create_listing))
        .route("/listing/:id", patch(patch_listing))
        .route("/listing/:id/discontinue", post(discontinue_listing))
        .layer(Extension(db))
}

async fn create_listing(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewListing>,
) -> Result<impl IntoResponse, ApiError> {
    let created = catalog::create_listing(&db, claims.user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Listing created successfully",
            "listing": created
        })),
    ))
}

async fn patch_listing(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(edit): Json<ListingEdit>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = catalog::update_listing(&db, id, claims.user_id, edit).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Listing updated successfully",
            "listing": updated
        })),
    ))
}

async fn discontinue_listing(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = catalog::discontinue_listing(&db, id, claims.user_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Listing discontinued",
            "listing": updated
        })),
    ))
}
