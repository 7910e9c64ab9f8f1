use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::feeds::weather::WeatherFeed;
use crate::feeds::Feeds;
use crate::services::advisory;

pub fn advisory_router(feeds: Arc<Feeds>) -> Router {
    Router::new()
        .route("/advisory/:location", get(get_advisory))
        .layer(Extension(feeds))
}

/// Current conditions plus threshold-rule suggestions. When the weather feed
/// is down the response degrades to nulls and an empty suggestion list.
async fn get_advisory(
    Path(location): Path<String>,
    Extension(feeds): Extension<Arc<Feeds>>,
) -> Result<impl IntoResponse, ApiError> {
    let current = feeds.weather.current(&location).await;
    let forecast = feeds.weather.forecast(&location).await;

    let suggestions = match &current {
        Some(weather) => advisory::suggestions(weather, &forecast),
        None => Vec::new(),
    };

    Ok((
        StatusCode::OK,
        Json(json!({
            "location": location,
            "current": current,
            "suggestions": suggestions
        })),
    ))
}
