use chrono::{Duration, Utc};
use serde::Serialize;

use crate::feeds::weather::{CurrentWeather, ForecastEntry};

#[derive(Serialize, Debug, PartialEq)]
pub struct Suggestion {
    pub activity: String,
    pub advice: String,
    pub reason: String,
}

const SPRAY_WIND_LIMIT: f64 = 15.0;
const PLANTING_TEMP_RANGE: (f64, f64) = (18.0, 30.0);
const DRYING_TEMP_MIN: f64 = 24.0;
const DRYING_HUMIDITY_MAX: f64 = 65.0;

/// Threshold-rule suggestions from current conditions and the forecast.
/// Pure derivation; the caller decides what to do when either input is
/// missing (an empty forecast simply produces fewer suggestions).
pub fn suggestions(current: &CurrentWeather, forecast: &[ForecastEntry]) -> Vec<Suggestion> {
    let mut out = Vec::new();
    let now = Utc::now();

    let rain_next_24h = forecast
        .iter()
        .any(|entry| entry.rain && entry.timestamp <= now + Duration::hours(24));
    let rain_next_3_days = forecast
        .iter()
        .any(|entry| entry.rain && entry.timestamp <= now + Duration::days(3));

    if rain_next_24h {
        out.push(Suggestion {
            activity: "spraying".to_string(),
            advice: "Postpone spraying".to_string(),
            reason: "Rain is expected within 24 hours and would wash off treatments".to_string(),
        });
    } else if current.wind_speed > SPRAY_WIND_LIMIT {
        out.push(Suggestion {
            activity: "spraying".to_string(),
            advice: "Postpone spraying".to_string(),
            reason: format!(
                "Wind speed of {:.0} m/s causes excessive drift",
                current.wind_speed
            ),
        });
    } else {
        out.push(Suggestion {
            activity: "spraying".to_string(),
            advice: "Good conditions for spraying".to_string(),
            reason: "No rain expected in the next 24 hours and winds are calm".to_string(),
        });
    }

    let (temp_low, temp_high) = PLANTING_TEMP_RANGE;
    if current.temperature >= temp_low && current.temperature <= temp_high && rain_next_3_days {
        out.push(Suggestion {
            activity: "planting".to_string(),
            advice: "Good window for planting".to_string(),
            reason: "Temperatures are in the growing band and rain is expected within 3 days"
                .to_string(),
        });
    } else if !rain_next_3_days {
        out.push(Suggestion {
            activity: "planting".to_string(),
            advice: "Delay planting".to_string(),
            reason: "No rain expected in the next 3 days; seedlings would need irrigation"
                .to_string(),
        });
    }

    if !rain_next_24h
        && current.temperature >= DRYING_TEMP_MIN
        && current.humidity <= DRYING_HUMIDITY_MAX
    {
        out.push(Suggestion {
            activity: "harvest_drying".to_string(),
            advice: "Good conditions for harvesting and drying".to_string(),
            reason: "Warm, dry weather with no rain expected in the next 24 hours".to_string(),
        });
    }

    out
}
