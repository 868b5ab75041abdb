use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use common::models::{CurrentConditions, HelloResponse, Source, WeatherPayload, WeatherResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::hello,
        handlers::get_weather,
    ),
    components(schemas(
        WeatherResponse,
        WeatherPayload,
        CurrentConditions,
        Source,
        HelloResponse,
    )),
    tags(
        (name = "weather", description = "Current weather by city name"),
    ),
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
