pub mod auth;
pub mod public;
pub mod user;

use axum::{middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::feeds::Feeds;
use crate::middleware::logging::logging_middleware;

use auth::auth_router;
use public::public_api_router;
use user::user_api_router;

pub fn create_api_router(
    db: Arc<DatabaseConnection>,
    config: Arc<Config>,
    feeds: Arc<Feeds>,
) -> Router {
    Router::new()
        .nest("/api", auth_router(db.clone(), config.clone()))
        .nest("/api", public_api_router(db.clone(), feeds))
        .nest("/api", user_api_router(db, config))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
