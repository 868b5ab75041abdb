use common::errors::AppError;
use common::http_client::HttpClient;
use common::models::GeoLocation;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// Forward geocoding against Nominatim (OpenStreetMap)
pub struct NominatimClient {
    http_client: Arc<HttpClient>,
    base_url: String,
}

impl NominatimClient {
    pub fn new(http_client: Arc<HttpClient>, base_url: String) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    /// Resolve a free-text place name to its best match, or `None` when
    /// Nominatim has no match.
    #[instrument(skip(self), fields(city = %name))]
    pub async fn geocode(&self, name: &str) -> Result<Option<GeoLocation>, AppError> {
        let url = format!(
            "{}?format=json&q={}&limit=1",
            self.base_url,
            urlencoding::encode(name)
        );

        let places: Vec<NominatimPlace> = self.http_client.get_json(&url).await?;

        let Some(place) = places.into_iter().next() else {
            info!("No geocoding match");
            return Ok(None);
        };

        let lat = parse_coordinate("lat", &place.lat)?;
        let lon = parse_coordinate("lon", &place.lon)?;
        let display_name = place
            .display_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| name.to_string());

        info!(lat, lon, display_name = %display_name, "Geocoded city");

        Ok(Some(GeoLocation {
            lat,
            lon,
            display_name,
        }))
    }
}

fn parse_coordinate(field: &str, raw: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::internal(format!("Geocoder returned invalid {}: {:?}", field, raw)))
}
