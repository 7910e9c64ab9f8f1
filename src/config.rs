use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

/// Connection settings for one external data feed.
#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

/// Process-wide configuration, resolved once at startup from the environment
/// (with `.env` support). Nothing here is read again after boot.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub market_feed: FeedConfig,
    pub weather_feed: FeedConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;
        let jwt_secret =
            std::env::var("SECRET").map_err(|_| ConfigError::MissingVar("SECRET"))?;
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Config {
            database_url,
            bind_addr,
            jwt_secret,
            market_feed: FeedConfig {
                api_key: std::env::var("MARKET_API_KEY").ok(),
                base_url: std::env::var("MARKET_BASE_URL")
                    .unwrap_or_else(|_| "https://api.vam.wfp.org/dataviz/api".to_string()),
                timeout: timeout_from_env("MARKET_TIMEOUT_SECS", 30)?,
            },
            weather_feed: FeedConfig {
                api_key: std::env::var("WEATHER_API_KEY").ok(),
                base_url: std::env::var("WEATHER_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openweathermap.org/data/2.5".to_string()),
                timeout: timeout_from_env("WEATHER_TIMEOUT_SECS", 10)?,
            },
        })
    }
}

fn timeout_from_env(var: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidVar(var, raw)),
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}
