//! Version information for parkade.

/// Parkade version from Cargo.toml
pub const PARKADE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version information reported on the health check.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VersionInfo {
    /// Engine library version.
    pub parkade: &'static str,
    /// Version of the binary hosting the engine, if it differs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            parkade: PARKADE_VERSION,
            server: None,
        }
    }
}

impl VersionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server(mut self, version: impl Into<String>) -> Self {
        self.server = Some(version.into());
        self
    }
}
