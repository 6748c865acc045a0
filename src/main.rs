//! Tally API Server
//!
//! Run with: cargo run --bin tally
//!
//! # Configuration
//!
//! Loaded from the first of `~/.config/tally/config.toml`,
//! `/etc/tally/config.toml` or `./config.toml` that exists (the server
//! refuses to start if that file is unreadable or malformed), then
//! overridden by environment variables:
//! - `TALLY_API_HOST` / `TALLY_API_PORT` (or `PORT`): listen address
//! - `TALLY_STATIC_DIR`: static asset directory (default: public)
//! - `TALLY_DEFAULT_BASE_URL`: fallback time-tracking API root
//! - `TALLY_RETRIES`, `TALLY_TIMEOUT_MS`, `TALLY_BACKOFF_MS`: outbound call policy
//! - `TALLY_LOG_LEVEL`, `TALLY_LOG_FORMAT`: logging
//! - `RUST_LOG`: full tracing filter, wins over `TALLY_LOG_LEVEL`

use tally::api::{serve, AppState};
use tally::config::{Config, LoggingConfig};
use tally::report::ReportService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing needs the logging section, so load errors are reported after init
    let loaded = Config::try_load_default();
    let logging = match &loaded {
        Ok((config, _)) => config.logging.clone(),
        Err(_) => Config::from_env().logging,
    };
    init_tracing(&logging);

    tracing::info!("Starting Tally API server v{}", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok((config, Some(path))) => {
            tracing::info!("Loaded config from {:?}", path);
            config
        }
        Ok((config, None)) => {
            tracing::info!("Using default config with environment overrides");
            config
        }
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        default_base_url = %config.discovery.default_base_url,
        retries = config.discovery.retries,
        timeout_ms = config.discovery.timeout_ms,
        "Discovery settings"
    );
    tracing::info!("Static assets: {:?}", config.api.static_dir);

    let service = ReportService::new(config.discovery.clone())?;
    let state = AppState::new(service, config.api.clone());

    serve(state, &config.api).await?;

    tracing::info!("Tally API server stopped");
    Ok(())
}

/// Initialize tracing from the logging section
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter_directive().into());

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
