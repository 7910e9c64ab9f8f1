pub mod prices;
pub mod weather;

use crate::config::Config;
use prices::WfpPriceFeed;
use weather::OpenWeatherFeed;

/// The external collaborators, built once at startup from config.
pub struct Feeds {
    pub prices: WfpPriceFeed,
    pub weather: OpenWeatherFeed,
}

impl Feeds {
    pub fn from_config(config: &Config) -> Self {
        Feeds {
            prices: WfpPriceFeed::new(config.market_feed.clone()),
            weather: OpenWeatherFeed::new(config.weather_feed.clone()),
        }
    }
}
