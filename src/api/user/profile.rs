use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::services::identity::{self, ProfileEdit};

pub fn profile_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/profile", get(get_profile).patch(patch_profile))
        .layer(Extension(db))
}

async fn get_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let account = identity::require_user(&db, claims.user_id).await?;
    Ok((StatusCode::OK, Json(account)))
}

async fn patch_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(edit): Json<ProfileEdit>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = identity::update_profile(&db, claims.user_id, edit).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Profile updated successfully",
            "user": updated
        })),
    ))
}
