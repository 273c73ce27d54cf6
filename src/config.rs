use std::time::Duration;

use chrono::TimeDelta;
use leptos::window;

/// Tunables for the weather panel's debounce and single-slot cache.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    pub debounce: Duration,
    pub cache_ttl: TimeDelta,
    pub coord_decimals: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            debounce: Duration::from_secs(2),
            cache_ttl: TimeDelta::minutes(10),
            coord_decimals: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub weather: WeatherConfig,
}

impl Config {
    pub fn from_window() -> Self {
        let api_base = window()
            .location()
            .origin()
            .map(|origin| format!("{origin}/api/"))
            .unwrap_or_else(|_| "/api/".to_owned());
        Config {
            api_base,
            weather: WeatherConfig::default(),
        }
    }
}
