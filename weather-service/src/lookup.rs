use common::errors::AppError;
use common::models::{WeatherPayload, WeatherResponse};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::backend::WeatherBackend;
use crate::cache::{WeatherCache, normalize_key};
use crate::geocoding::NominatimClient;

pub const MISSING_CITY: &str = "Missing `city` query parameter";
pub const LOCATION_NOT_FOUND: &str = "Location not found";
pub const INVALID_QUERY: &str = "Invalid query string";

/// City name → geocode → current weather, fronted by the cache.
pub struct WeatherService {
    cache: Arc<WeatherCache>,
    geocoder: NominatimClient,
    backend: WeatherBackend,
}

impl WeatherService {
    pub fn new(cache: Arc<WeatherCache>, geocoder: NominatimClient, backend: WeatherBackend) -> Self {
        Self {
            cache,
            geocoder,
            backend,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Concurrent misses for the same city each go upstream; the last store wins.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn lookup(&self, city: &str) -> Result<WeatherResponse, AppError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AppError::validation(MISSING_CITY));
        }

        let key = normalize_key(city);
        if let Some(cached) = self.cache.lookup(&key).await {
            info!(key = %key, "Cache hit");
            return Ok(WeatherResponse::from_cache(cached));
        }

        info!(key = %key, "Cache miss, fetching from upstream");

        let Some(place) = self.geocoder.geocode(city).await? else {
            warn!(city = %city, "Location not found");
            return Err(AppError::not_found(LOCATION_NOT_FOUND));
        };

        let reading = self.backend.fetch_current(place.lat, place.lon).await?;

        let payload = WeatherPayload {
            city: reading.city.unwrap_or(place.display_name),
            lat: place.lat,
            lon: place.lon,
            current: reading.current,
        };

        self.cache.store(&key, payload.clone()).await;

        Ok(WeatherResponse::from_api(payload))
    }
}
