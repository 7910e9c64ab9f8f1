pub mod listings;
pub mod market;
pub mod notifications;
pub mod orders;
pub mod pools;
pub mod profile;
pub mod reviews;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::middleware::auth::{auth_middleware, AuthState};

/// Routes requiring a valid bearer token. Fine-grained capability checks
/// (who may list produce, cancel an order, respond to a review) live in the
/// service layer.
pub fn user_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .merge(listings::listing_router(db.clone()))
        .merge(orders::order_router(db.clone()))
        .merge(pools::pool_router(db.clone()))
        .merge(reviews::review_router(db.clone()))
        .merge(market::market_router(db.clone()))
        .merge(notifications::notification_router(db.clone()))
        .merge(profile::profile_router(db.clone()))
        .layer(from_fn_with_state(
            AuthState {
                db,
                secret: config.jwt_secret.clone(),
            },
            auth_middleware,
        ))
}
