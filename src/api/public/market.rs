use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::feeds::Feeds;
use crate::services::market;

pub fn market_router(db: Arc<DatabaseConnection>, feeds: Arc<Feeds>) -> Router {
    Router::new()
        .route("/prices", get(get_prices))
        .layer(Extension(db))
        .layer(Extension(feeds))
}

#[derive(Deserialize, Debug)]
struct PricesQuery {
    days_back: Option<i64>,
}

async fn get_prices(
    Query(params): Query<PricesQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(feeds): Extension<Arc<Feeds>>,
) -> Result<impl IntoResponse, ApiError> {
    let days_back = params.days_back.unwrap_or(30);
    let prices = market::combined_prices(&db, &feeds.prices, days_back).await?;
    Ok((StatusCode::OK, Json(prices)))
}
