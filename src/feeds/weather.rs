use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FeedConfig;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
    pub wind_speed: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub description: String,
    pub rain: bool,
}

/// Pull boundary for weather data. Failures degrade to `None` / empty rather
/// than propagating; the advisory endpoint must never hard-fail because the
/// collaborator is down.
#[async_trait]
pub trait WeatherFeed: Send + Sync {
    async fn current(&self, location: &str) -> Option<CurrentWeather>;
    async fn forecast(&self, location: &str) -> Vec<ForecastEntry>;
}

/// OpenWeather client over the configured base url, key and timeout.
pub struct OpenWeatherFeed {
    client: reqwest::Client,
    config: FeedConfig,
}

impl OpenWeatherFeed {
    pub fn new(config: FeedConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        location: &str,
    ) -> Result<T, reqwest::Error> {
        self.client
            .get(format!("{}/{}", self.config.base_url, path))
            .query(&[
                ("q", location),
                ("appid", self.api_key()),
                ("units", "metric"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl WeatherFeed for OpenWeatherFeed {
    async fn current(&self, location: &str) -> Option<CurrentWeather> {
        match self.request::<OwCurrent>("weather", location).await {
            Ok(raw) => Some(CurrentWeather {
                temperature: raw.main.temp,
                humidity: raw.main.humidity,
                description: raw
                    .weather
                    .first()
                    .map(|w| w.description.clone())
                    .unwrap_or_default(),
                wind_speed: raw.wind.speed,
            }),
            Err(err) => {
                tracing::warn!(error = %err, location, "weather feed unavailable");
                None
            }
        }
    }

    async fn forecast(&self, location: &str) -> Vec<ForecastEntry> {
        match self.request::<OwForecast>("forecast", location).await {
            Ok(raw) => raw
                .list
                .into_iter()
                .filter_map(|entry| {
                    let timestamp = DateTime::<Utc>::from_timestamp(entry.dt, 0)?;
                    let description = entry
                        .weather
                        .first()
                        .map(|w| w.description.clone())
                        .unwrap_or_default();
                    let rain = entry.rain.is_some() || description.contains("rain");
                    Some(ForecastEntry {
                        timestamp,
                        temperature: entry.main.temp,
                        description,
                        rain,
                    })
                })
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, location, "forecast feed unavailable");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwCondition>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecast {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwCondition>,
    rain: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}
