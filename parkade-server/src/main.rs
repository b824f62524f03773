//! parkade-server: runs the parking lot engine behind HTTP.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use parkade::{
    ParkingService, VersionInfo,
    transport::{ServerConfig, serve},
};

/// Parking lot slot allocation server
#[derive(Parser, Debug)]
#[command(name = "parkade", version, about, long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "PARKADE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3000, env = "PARKADE_PORT")]
    port: u16,

    /// Mount POST /shutdown so the server can be stopped over HTTP
    #[arg(long, env = "PARKADE_ENABLE_SHUTDOWN_ENDPOINT")]
    enable_shutdown_endpoint: bool,

    /// Initialize the lot with this many slots at startup
    #[arg(long, env = "PARKADE_SLOTS")]
    slots: Option<i64>,
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            enable_shutdown_endpoint: self.enable_shutdown_endpoint,
        }
    }
}

/// Initialize tracing with PARKADE_LOG and LOG_FORMAT support.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let base_level = match std::env::var("PARKADE_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };

        EnvFilter::new(format!(
            "parkade={level},parkade_server={level}",
            level = base_level
        ))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    info!("parkade {}", env!("CARGO_PKG_VERSION"));

    let service = Arc::new(
        ParkingService::new().with_version(VersionInfo::new().with_server(env!("CARGO_PKG_VERSION"))),
    );

    match cli.slots {
        Some(slots) => {
            let total = service.initialize(slots)?;
            info!(total_slots = total, "Parking lot initialized from configuration");
        }
        None => warn!("No slot count configured, waiting for POST /parking_lot"),
    }

    serve(cli.server_config(), service).await
}
