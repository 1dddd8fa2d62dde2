//! Backend entry-point: loads settings, wires adapters, and serves HTTP.

mod server;

use actix_web::dev::ServerHandle;
use actix_web::web;
use ortho_config::OrthoConfig;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ebuddy_backend::inbound::http::health::HealthState;
use server::{ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let config = settings
        .into_config()
        .map_err(|e| std::io::Error::other(format!("invalid settings: {e}")))?;
    info!(bind_addr = %config.bind_addr(), "starting ebuddy backend");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    actix_web::rt::spawn(drain_on_shutdown(health_state, server.handle()));
    server.await
}

/// Fail liveness first, then stop accepting and let in-flight requests finish.
async fn drain_on_shutdown(health_state: web::Data<HealthState>, handle: ServerHandle) {
    shutdown_signal().await;
    health_state.mark_unhealthy();
    handle.stop(true).await;
    info!("server drained");
}

async fn shutdown_signal() {
    let interrupt = async {
        match ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}
