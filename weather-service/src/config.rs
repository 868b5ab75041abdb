use common::tracing::LogFormat;
use std::env;
use std::time::Duration;

/// Freshness window for cached lookups. Fixed, not read from the environment.
pub const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Nominatim's usage policy requires an identifying User-Agent.
pub const USER_AGENT: &str = "weather-service/0.1";

/// The front end shipped with this crate, independent of the working directory.
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/public");

pub struct Config {
    pub port: u16,
    pub nominatim_url: String,
    pub open_meteo_url: String,
    pub openweather_url: String,
    /// Presence selects the OpenWeatherMap backend for the process lifetime.
    pub openweather_api_key: Option<String>,
    pub cache_max_entries: Option<usize>,
    pub upstream_timeout: Option<Duration>,
    pub static_dir: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            nominatim_url: lookup("NOMINATIM_URL")
                .unwrap_or_else(|| "https://nominatim.openstreetmap.org/search".to_string()),
            open_meteo_url: lookup("OPEN_METEO_URL")
                .unwrap_or_else(|| "https://api.open-meteo.com/v1/forecast".to_string()),
            openweather_url: lookup("OPENWEATHER_URL")
                .unwrap_or_else(|| "https://api.openweathermap.org/data/2.5/weather".to_string()),
            openweather_api_key: lookup("OPENWEATHER_API_KEY")
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            cache_max_entries: lookup("CACHE_MAX_ENTRIES")
                .and_then(|n| n.parse().ok())
                .filter(|n: &usize| *n > 0),
            upstream_timeout: lookup("UPSTREAM_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|s: &u64| *s > 0)
                .map(Duration::from_secs),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::from_name(&f))
                .unwrap_or_default(),
        }
    }
}
