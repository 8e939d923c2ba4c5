mod api;
mod app_state;
mod db;
mod env_config;
mod error;
mod layers;
mod logger;
mod services;
mod utils;

use app_state::models::AppState;
use db::snapshot::repository::snapshot_repository::JsonFileSnapshotRepository;
use env_config::models::{app_config::AppConfig, app_env::AppEnv, app_setting::AppSettings};
use error::{AppError, Result};
use services::indicators::scheduler::SignalsScheduler;
use services::market_data::CoinGeckoClient;
use std::{net::SocketAddr, process::ExitCode, sync::Arc};
use tokio::{net::TcpListener, signal, sync::watch};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The logger may not be up yet
            eprintln!("crypto-signals: {}", err);
            error!("Fatal: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let settings: Arc<AppSettings> = Arc::new(initialize_application()?);

    let server_address: SocketAddr = format!(
        "{}:{}",
        settings.app_env.server_address, settings.app_env.server_port,
    )
    .parse()
    .map_err(|e| AppError::Config(format!("Invalid server address configuration: {}", e)))?;

    info!("Server will listen on: {}", server_address);

    let app_state = Arc::new(initialize_services(settings.clone())?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler_handle = SignalsScheduler::new(app_state.clone()).start(shutdown_rx);

    let app_router = api::create_router(app_state.clone());
    let server_result = start_http_server(app_router, server_address, shutdown_tx).await;

    if let Some(handle) = scheduler_handle {
        if let Err(err) = handle.await {
            error!("Scheduler task ended abnormally: {}", err);
        }
    }

    info!("Application stopped");
    server_result
}

/// Loads settings and starts logging
fn initialize_application() -> Result<AppSettings> {
    let environment = AppEnv::new()?;
    let config = AppConfig::new(&environment)?;
    let app_settings = AppSettings {
        app_config: config,
        app_env: environment,
    };

    logger::init_logger(
        &app_settings.app_config.log.level,
        &app_settings.app_config.log.format,
        app_settings.app_env.is_local(),
    )?;

    info!("Starting crypto signals service...");
    info!("Current environment: {}", app_settings.app_env.env);

    if app_settings.app_env.is_local() {
        info!("Running in local development mode");
        debug!("Configuration details: {:#?}", app_settings);
    } else {
        info!("Running in production mode");
    }

    Ok(app_settings)
}

fn initialize_services(settings: Arc<AppSettings>) -> Result<AppState> {
    let market_data = CoinGeckoClient::new(&settings.app_config.market_data)?;

    let snapshot_repository = JsonFileSnapshotRepository::new(&settings.app_config.snapshot.path);
    info!(
        "Snapshot store: {}",
        snapshot_repository.path().display()
    );

    Ok(AppState::new(
        settings,
        Arc::new(market_data),
        Arc::new(snapshot_repository),
    ))
}

async fn start_http_server(
    app: axum::Router,
    addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
) -> Result<()> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr).await.map_err(|err| {
        error!("Failed to bind to address {}: {}", addr, err);
        AppError::from(err)
    })?;

    info!("Server started successfully, now accepting connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = signal::ctrl_c().await {
                error!("Failed to listen for ctrl-c: {}", err);
            }
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|err| {
            error!("Server error: {}", err);
            AppError::from(err)
        })
}
