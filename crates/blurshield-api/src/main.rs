//! API server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blurshield_api::{create_router, ApiConfig, AppState};
use blurshield_media::{DetectorPool, YuNetDetector};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("blurshield=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    info!("starting blurshield-api");

    let config = ApiConfig::from_env();
    info!(host = %config.host, port = config.port, "loaded configuration");

    if config.dev_mode {
        warn!("DEV_MODE is set: X-API-Key checks are bypassed");
    }

    let model_path = blurshield_media::detector::find_default_model_path()
        .unwrap_or_else(|| {
            error!("no YuNet model found at any default path");
            std::process::exit(1);
        })
        .to_string();

    let pool = DetectorPool::new(config.detector_pool_size, || {
        YuNetDetector::new(&model_path).map(|d| Box::new(d) as Box<dyn blurshield_media::Detector>)
    });
    let pool = match pool {
        Ok(p) => Arc::new(p),
        Err(e) => {
            error!(error = %e, "failed to initialize detector pool");
            std::process::exit(1);
        }
    };
    info!(size = pool.size(), "detector pool initialized");

    let state = AppState::new(config.clone(), pool);

    tokio::spawn(blurshield_api::sweeper::run(state.temp_dir.clone()));

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("invalid bind address");

    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("server shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C handler");
    info!("received shutdown signal");
}
