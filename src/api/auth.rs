use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ApiError;
use crate::services::identity::{self, RegisterPayload};

pub fn auth_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .layer(Extension(db))
        .layer(Extension(config))
}

async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let created = identity::register(&db, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": created
        })),
    ))
}

#[derive(Deserialize, Debug)]
struct LoginPayload {
    username: String,
    password: String,
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let token =
        identity::login(&db, &payload.username, &payload.password, &config.jwt_secret).await?;
    Ok((StatusCode::OK, Json(json!({ "token": token }))))
}
