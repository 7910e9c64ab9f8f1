use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::services::notify;

pub fn notification_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/notifications", get(get_notifications))
        .route("/notifications/:id/read", post(mark_read))
        .route("/notifications/read-all", post(mark_all_read))
        .layer(Extension(db))
}

async fn get_notifications(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = notify::list_notifications(&db, claims.user_id).await?;
    Ok((StatusCode::OK, Json(rows)))
}

async fn mark_read(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    notify::mark_read(&db, claims.user_id, id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Notification marked as read" })),
    ))
}

async fn mark_all_read(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = notify::mark_all_read(&db, claims.user_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": format!("{} notifications marked as read", updated) })),
    ))
}
