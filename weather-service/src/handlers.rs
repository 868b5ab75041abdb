use axum::{extract::State, response::Json};
use axum_extra::extract::{Query, QueryRejection};
use common::errors::AppError;
use common::models::{HelloResponse, WeatherResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::lookup::{INVALID_QUERY, WeatherService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check")
    )
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "weather-service" }))
}

#[utoipa::path(
    get,
    path = "/api/hello",
    responses(
        (status = 200, description = "Greeting used by the front end", body = HelloResponse)
    )
)]
pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        name: "Weather Service".to_string(),
        message: "Hello from the API!".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    })
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/weather",
    params(
        ("city" = String, Query, description = "City name, e.g. London")
    ),
    responses(
        (status = 200, description = "Current weather for the city", body = WeatherResponse),
        (status = 400, description = "Missing `city` query parameter or malformed query string"),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Upstream or internal failure")
    ),
    tag = "weather"
)]
pub async fn get_weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<WeatherResponse>, AppError> {
    let Query(params) = query.map_err(|rejection| {
        warn!(error = %rejection, "Rejected weather query string");
        AppError::validation(INVALID_QUERY)
    })?;
    let city = params.city.unwrap_or_default();
    info!(city = %city, "Weather request received");

    match state.service.lookup(&city).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            if !matches!(e, AppError::ValidationError(_) | AppError::NotFound(_)) {
                error!(city = %city, error = %e, "Weather lookup failed");
            }
            Err(e)
        }
    }
}
