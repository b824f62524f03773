//! HTTP server: bind, serve the lot routes, drain on shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::service::ParkingService;

use super::routes::routes;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Mount `POST /shutdown`. Off by default: anyone who can reach the
    /// port could otherwise stop the server.
    pub enable_shutdown_endpoint: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_shutdown_endpoint: false,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Why the server stopped accepting connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopCause {
    Interrupt,
    Terminate,
    Requested,
}

/// Bind to the configured address and serve until a stop signal arrives.
pub async fn serve(config: ServerConfig, service: Arc<ParkingService>) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "parkade listening");

    let app = routes(Arc::clone(&service), config.enable_shutdown_endpoint);
    let stop = stop_requested(service.shutdown_rx());
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let cause = stop.await;
            info!(?cause, "Stopping parkade server");
        })
        .await?;

    let health = service.health();
    info!(
        total_slots = health.total_slots,
        available_slots = health.available_slots,
        waitlisted = health.waitlisted,
        "Server shutdown complete"
    );
    Ok(())
}

/// Resolve on SIGINT, SIGTERM (unix) or a request through the service.
///
/// A signal that cannot be installed is logged and then ignored; the other
/// sources still stop the server.
async fn stop_requested(mut shutdown_rx: watch::Receiver<bool>) -> StopCause {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "Cannot listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        }
        #[cfg(not(unix))]
        std::future::pending::<()>().await;
    };

    let requested = async {
        // A dropped sender means the service is gone; nothing left to wait for.
        if shutdown_rx.wait_for(|&stop| stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupt => StopCause::Interrupt,
        _ = terminate => StopCause::Terminate,
        _ = requested => StopCause::Requested,
    }
}
