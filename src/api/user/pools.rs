use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::services::group_buy;

pub fn pool_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/pool", post(create_pool))
        .route("/pool/:id/join", post(join_pool))
        .route("/pool/:id/cancel", post(cancel_pool))
        .route("/pool/:id/complete", post(complete_pool))
        .layer(Extension(db))
}

#[derive(Deserialize, Debug)]
struct CreatePoolPayload {
    listing_id: i32,
    target_quantity: i32,
    my_quantity: i32,
    deadline: DateTime<Utc>,
}

async fn create_pool(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePoolPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = group_buy::create_pool(
        &db,
        claims.user_id,
        payload.listing_id,
        payload.target_quantity,
        payload.my_quantity,
        payload.deadline,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Group buy pool created! Share with other farmers to reach the target.",
            "pool": created
        })),
    ))
}

#[derive(Deserialize, Debug)]
struct JoinPoolPayload {
    quantity: i32,
}

async fn join_pool(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<JoinPoolPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = group_buy::join_pool(&db, id, claims.user_id, payload.quantity).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("Successfully joined group buy! {} units added.", payload.quantity),
            "pool": updated
        })),
    ))
}

async fn cancel_pool(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = group_buy::cancel_pool(&db, id, claims.user_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Pool cancelled",
            "pool": updated
        })),
    ))
}

async fn complete_pool(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = group_buy::complete_pool(&db, id, claims.user_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Pool marked as completed",
            "pool": updated
        })),
    ))
}
