use common::http_client::HttpClient;
use common::tracing::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use weather_service::backend::WeatherBackend;
use weather_service::cache::WeatherCache;
use weather_service::config::{self, Config};
use weather_service::geocoding::NominatimClient;
use weather_service::handlers::AppState;
use weather_service::lookup::WeatherService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    init_tracing(config.log_format);

    let http_client = Arc::new(HttpClient::new(config::USER_AGENT, config.upstream_timeout)?);
    let cache = Arc::new(WeatherCache::new(config.cache_max_entries));
    let geocoder = NominatimClient::new(http_client.clone(), config.nominatim_url.clone());
    let backend = WeatherBackend::from_config(&config, http_client.clone());

    let service = Arc::new(WeatherService::new(cache.clone(), geocoder, backend));
    info!(
        backend = service.backend_name(),
        cache_ttl_secs = cache.ttl().as_secs(),
        cache_max_entries = ?config.cache_max_entries,
        upstream_timeout = ?http_client.timeout(),
        "Weather lookup configured"
    );

    let app = weather_service::router(AppState { service }, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Weather service starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Weather service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
