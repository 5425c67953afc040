mod config;
mod routes;
mod search;
mod timers;

use std::sync::Arc;

use axum::Router;
use landcover_core::shell::MapShell;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use search::{LocationSearch, SetupError};
use timers::{SharedShell, TimerRunner};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env();
    let state = match AppState::new(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("startup failed: {e}");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("cannot bind {}: {e}", config.bind_addr);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {}", config.bind_addr);
    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Clone)]
pub struct AppState {
    pub shell: SharedShell,
    pub timers: TimerRunner,
    pub search: LocationSearch,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, SetupError> {
        let search = LocationSearch::new(&config.geocoder_url, config.geocoder_timeout)?;
        let shell = MapShell::new(config.timings, &config.report_location);
        tracing::info!(
            "geocoder {}, dialog timings {:?}",
            config.geocoder_url,
            config.timings
        );
        Ok(Self {
            shell: Arc::new(tokio::sync::Mutex::new(shell)),
            timers: TimerRunner::new(),
            search,
        })
    }
}
