use std::{net::SocketAddr, process};

use axum::Server;
use tokio::signal::{self, ctrl_c};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use axum_webtasks_rust::{config::Config, route::create_router, AppState};

// Entry point of the application
#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            error!("Configuration error: {err}");
            process::exit(1);
        }
    };

    info!("Initializing state...");
    let app_state = match AppState::new(config).await {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to initialize state: {err}");
            process::exit(1);
        }
    };

    let address = app_state.config.address();
    let addr: SocketAddr = match address.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!("Invalid bind address {address}: {err}");
            process::exit(1);
        }
    };

    let storage = app_state.storage.clone();
    let app = create_router(app_state);

    let server = match Server::try_bind(&addr) {
        Ok(builder) => builder,
        Err(err) => {
            error!("Failed to bind {addr}: {err}");
            process::exit(1);
        }
    };

    info!("🚀 Server running on http://{addr}");

    if let Err(err) = server
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {err}");
        storage.close().await;
        process::exit(1);
    }

    storage.close().await;
    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!("Failed to install terminate handler: {err}");
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
