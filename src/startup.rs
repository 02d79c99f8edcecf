use crate::shutdown;
use startup_billboard::components::google_calendar::GoogleCalendarClient;
use startup_billboard::components::EventCacheHandle;
use startup_billboard::config::Config;
use startup_billboard::error::Error;
use startup_billboard::web::{create_router, AppState};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the calendar cache and serve the billboard until a shutdown signal arrives
pub async fn start_server(config: Config) -> miette::Result<()> {
    let client = GoogleCalendarClient::new(
        &config.calendar_endpoint,
        &config.google_calendar_id,
        &config.google_api_key,
        config.fetch_timeout,
    )
    .map_err(Error::from)?;

    info!(
        "Showing calendar {} with offset {}, change detection: {}",
        config.google_calendar_id, config.utc_offset, config.change_detection
    );

    // The cache actor owns all fetched state
    let cache = EventCacheHandle::new(client, config.fetch_timeout);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let app = create_router(AppState::new(cache.clone(), config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(Error::from)?;
    info!("Listening on {}", addr);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await;

    // Stop the cache actor once no more requests are served
    if let Err(e) = cache.shutdown().await {
        error!("Error shutting down event cache: {:?}", e);
    } else {
        info!("Event cache shut down successfully");
    }

    result.map_err(|e| Error::from(e).into())
}
