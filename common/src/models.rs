use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A geocoded place
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

/// Current conditions as reported by the active weather backend.
///
/// Wind speed is always km/h, regardless of backend.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub winddirection: Option<f64>,
    pub weathercode: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Cached unit of weather data for one city.
///
/// `current` is `None` when the backend answered without a reading.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct WeatherPayload {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub current: Option<CurrentConditions>,
}

/// Where a response was served from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Api,
}

/// Response body of `GET /api/weather`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct WeatherResponse {
    pub source: Source,
    #[serde(flatten)]
    pub payload: WeatherPayload,
}

impl WeatherResponse {
    pub fn from_cache(payload: WeatherPayload) -> Self {
        Self {
            source: Source::Cache,
            payload,
        }
    }

    pub fn from_api(payload: WeatherPayload) -> Self {
        Self {
            source: Source::Api,
            payload,
        }
    }
}

/// Response body of `GET /api/hello`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HelloResponse {
    pub name: String,
    pub message: String,
    pub timestamp: String,
}
