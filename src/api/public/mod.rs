pub mod advisory;
pub mod listings;
pub mod market;
pub mod pools;
pub mod reviews;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::feeds::Feeds;

pub fn public_api_router(db: Arc<DatabaseConnection>, feeds: Arc<Feeds>) -> Router {
    Router::new()
        .merge(listings::listing_router(db.clone()))
        .merge(market::market_router(db.clone(), feeds.clone()))
        .merge(pools::pool_router(db.clone()))
        .merge(reviews::review_router(db))
        .merge(advisory::advisory_router(feeds))
}
