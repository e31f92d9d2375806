//! HTTP boundary of the car rating service.
//!
//! Routes, all under `/api`:
//! - `GET /api/cars/random`: next car to rate, without tallies.
//! - `POST /api/cars/vote`: record `{car_id, vote_type}` and return the aggregate.
//! - `GET /api/cars/{car_id}`: current aggregate for one car.
//! - `GET /api/health`: liveness probe.
//!
//! Configuration comes from `CARRATER_*` environment variables, see [`config`].
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::{get, post},
    Router,
};
use carrater_core::init_logging;
use log::{error, info};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use error::AppError;
use routes::{car_stats_handler, health_handler, log_requests, random_car_handler, vote_handler};
use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/cars/random", get(random_car_handler))
        .route("/cars/vote", post(vote_handler))
        .route("/cars/{car_id}", get(car_stats_handler))
        .route("/health", get(health_handler));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<(), AppError> {
    let config = Config::load()?;
    init_logging(&config.log_level, config.log_dir.as_deref()).map_err(AppError::Logging)?;
    info!(
        "event=config_loaded module=server status=ok store={} db_path={} seed={} address={}",
        config.store,
        config.db_path.display(),
        config.seed,
        config.bind_address()
    );

    let state = AppState::initialize(&config).await?;
    let app = build_router(state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("event=server_start module=server status=ok address={address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("event=shutdown_signal module=server status=ok signal=ctrl_c"),
            Err(err) => {
                error!("event=shutdown_signal module=server status=error signal=ctrl_c error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown_signal module=server status=ok signal=sigterm");
            }
            Err(err) => {
                error!("event=shutdown_signal module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
