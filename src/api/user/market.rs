use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::services::market::{self, PriceReportPayload};

pub fn market_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/prices/report", post(submit_report))
        .layer(Extension(db))
}

async fn submit_report(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PriceReportPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = market::submit_report(&db, claims.user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Price report submitted",
            "report": created
        })),
    ))
}
