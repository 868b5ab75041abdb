use common::errors::AppError;
use common::http_client::HttpClient;
use common::models::CurrentConditions;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::Config;

/// What a backend reports for a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentReading {
    /// Display name preferred over the geocoder's, when the backend has one.
    pub city: Option<String>,
    pub current: Option<CurrentConditions>,
}

/// The weather API in use, fixed at startup.
pub enum WeatherBackend {
    OpenMeteo(OpenMeteoClient),
    OpenWeather(OpenWeatherClient),
}

impl WeatherBackend {
    /// OpenWeatherMap when an API key is configured, Open-Meteo otherwise.
    pub fn from_config(config: &Config, http_client: Arc<HttpClient>) -> Self {
        match &config.openweather_api_key {
            Some(api_key) => WeatherBackend::OpenWeather(OpenWeatherClient::new(
                http_client,
                config.openweather_url.clone(),
                api_key.clone(),
            )),
            None => WeatherBackend::OpenMeteo(OpenMeteoClient::new(
                http_client,
                config.open_meteo_url.clone(),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeatherBackend::OpenMeteo(_) => "open-meteo",
            WeatherBackend::OpenWeather(_) => "openweathermap",
        }
    }

    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<CurrentReading, AppError> {
        match self {
            WeatherBackend::OpenMeteo(client) => client.fetch_current(lat, lon).await,
            WeatherBackend::OpenWeather(client) => client.fetch_current(lat, lon).await,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current_weather: Option<CurrentConditions>,
}

pub struct OpenMeteoClient {
    http_client: Arc<HttpClient>,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(http_client: Arc<HttpClient>, base_url: String) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    #[instrument(skip(self))]
    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<CurrentReading, AppError> {
        let url = format!(
            "{}?latitude={}&longitude={}&current_weather=true&timezone=auto",
            self.base_url, lat, lon
        );

        let response: OpenMeteoResponse = self.http_client.get_json(&url).await?;

        info!(
            has_current = response.current_weather.is_some(),
            "Fetched weather from Open-Meteo"
        );

        Ok(CurrentReading {
            city: None,
            current: response.current_weather,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwResponse {
    name: Option<String>,
    sys: Option<OwSys>,
    main: Option<OwMain>,
    wind: Option<OwWind>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: Option<i64>,
    description: Option<String>,
}

pub struct OpenWeatherClient {
    http_client: Arc<HttpClient>,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(http_client: Arc<HttpClient>, base_url: String, api_key: String) -> Self {
        Self {
            http_client,
            base_url,
            api_key,
        }
    }

    #[instrument(skip(self))]
    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<CurrentReading, AppError> {
        let url = format!(
            "{}?lat={}&lon={}&appid={}&units=metric",
            self.base_url,
            lat,
            lon,
            urlencoding::encode(&self.api_key)
        );

        let response: OwResponse = self.http_client.get_json(&url).await?;

        info!(name = ?response.name, "Fetched weather from OpenWeatherMap");

        Ok(response.into_reading())
    }
}

impl OwResponse {
    fn into_reading(self) -> CurrentReading {
        let city = self.name.filter(|n| !n.is_empty()).map(|name| {
            let country = self.sys.and_then(|s| s.country).unwrap_or_default();
            format!("{}, {}", name, country)
        });

        let first = self.weather.into_iter().next();
        let (weathercode, description) = match first {
            Some(w) => (w.id, w.description.unwrap_or_default()),
            None => (None, String::new()),
        };

        let (windspeed, winddirection) = match self.wind {
            Some(wind) => (wind.speed.map(mps_to_kmh), wind.deg),
            None => (None, None),
        };

        CurrentReading {
            city,
            current: Some(CurrentConditions {
                temperature: self.main.and_then(|m| m.temp),
                windspeed,
                winddirection,
                weathercode,
                description: Some(description),
            }),
        }
    }
}

/// m/s to km/h, one decimal place
fn mps_to_kmh(speed: f64) -> f64 {
    (speed * 3.6 * 10.0).round() / 10.0
}
