use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use agrimarket::api::create_api_router;
use agrimarket::config::Config;
use agrimarket::entities::{primary_setup, setup_schema};
use agrimarket::feeds::Feeds;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    let db: DatabaseConnection = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to the database");
    setup_schema(&db).await.expect("Failed to create schema");
    primary_setup(&db).await.expect("Failed to seed categories");

    let shared_db = Arc::new(db);
    let feeds = Arc::new(Feeds::from_config(&config));
    let bind_addr = config.bind_addr.clone();
    let config = Arc::new(config);

    let app = create_api_router(shared_db, config, feeds);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(addr = %bind_addr, "agrimarket listening");
    axum::serve(listener, app).await.expect("Server error");
}
