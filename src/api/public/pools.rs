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
use crate::services::group_buy;

pub fn pool_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/pool", get(get_open_pools))
        .route("/pool/:id", get(get_pool))
        .layer(Extension(db))
}

async fn get_open_pools(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let pools = group_buy::list_open_pools(&db).await?;
    Ok((StatusCode::OK, Json(pools)))
}

async fn get_pool(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<impl IntoResponse, ApiError> {
    let (pool, participants) = group_buy::pool_detail(&db, id).await?;
    let progress = if pool.target_quantity > 0 {
        pool.current_quantity as f64 / pool.target_quantity as f64 * 100.0
    } else {
        0.0
    };
    Ok((
        StatusCode::OK,
        Json(json!({
            "pool": pool,
            "participants": participants,
            "progress_percentage": progress
        })),
    ))
}
