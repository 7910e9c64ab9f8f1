use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::error::ApiError;
use crate::services::catalog::{self, BrowseFilter};

pub fn listing_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/listing", get(get_listings))
        .route("/listing/:id", get(get_listing))
        .route("/category", get(get_categories))
        .layer(Extension(db))
}

async fn get_listings(
    Query(filter): Query<BrowseFilter>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let listings = catalog::browse_listings(&db, filter).await?;
    Ok((StatusCode::OK, Json(listings)))
}

async fn get_listing(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = catalog::find_listing(&db, id).await?;
    Ok((StatusCode::OK, Json(listing)))
}

async fn get_categories(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = catalog::list_categories(&db).await?;
    Ok((StatusCode::OK, Json(categories)))
}
