use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::services::reviews;

pub fn review_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/farmer/:id/reviews", get(get_farmer_reviews))
        .layer(Extension(db))
}

async fn get_farmer_reviews(
    Path(farmer_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let (rows, stats) = reviews::farmer_reviews(&db, farmer_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "reviews": rows,
            "stats": stats
        })),
    ))
}
