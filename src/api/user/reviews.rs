use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::services::reviews::{self, ReviewPayload};

pub fn review_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/order/:id/review", post(create_review))
        .route("/review/:id/response", post(respond_to_review))
        .layer(Extension(db))
}

async fn create_review(
    Path(order_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ReviewPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = reviews::record_review(&db, order_id, claims.user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Review submitted successfully",
            "review": created
        })),
    ))
}

#[derive(Deserialize, Debug)]
struct ResponsePayload {
    response_text: String,
}

async fn respond_to_review(
    Path(review_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ResponsePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created =
        reviews::respond_to_review(&db, review_id, claims.user_id, payload.response_text).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Response added successfully",
            "response": created
        })),
    ))
}
