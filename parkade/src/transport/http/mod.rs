//! HTTP transport: axum routes over [`crate::service::ParkingService`].

mod routes;
mod server;

pub use routes::{ErrorResponse, HealthCheckResponse, routes};
pub use server::{ServerConfig, serve};
