use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::services::orders::{self, DeliveryInfo};

pub fn order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/order", get(get_my_orders).post(place_order))
        .route("/order/:id", get(get_order))
        .route("/order/:id/status", patch(update_status))
        .route("/order/:id/cancel", post(cancel_order))
        .layer(Extension(db))
}

#[derive(Deserialize, Debug)]
struct PlaceOrderPayload {
    listing_id: i32,
    quantity: i32,
    #[serde(flatten)]
    delivery: DeliveryInfo,
}

async fn place_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PlaceOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = orders::place_order(
        &db,
        claims.user_id,
        payload.listing_id,
        payload.quantity,
        payload.delivery,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Order placed successfully! Order number: {}", created.order_number),
            "order": created
        })),
    ))
}

async fn get_my_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (placed, received) = orders::my_orders(&db, claims.user_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "orders_placed": placed,
            "orders_received": received
        })),
    ))
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (order, items) = orders::order_detail(&db, id, claims.user_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "order": order,
            "items": items
        })),
    ))
}

#[derive(Deserialize, Debug)]
struct UpdateStatusPayload {
    status: String,
}

async fn update_status(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = orders::update_status(&db, id, claims.user_id, &payload.status).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("Order status updated to {}", updated.status),
            "order": updated
        })),
    ))
}

async fn cancel_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let cancelled = orders::cancel_order(&db, id, claims.user_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Order cancelled successfully",
            "order": cancelled
        })),
    ))
}
