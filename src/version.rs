// Crate identity baked in at build time

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// User-Agent sent with every request to the service, e.g. "sentinel-dashboard/0.1.0".
pub fn user_agent() -> String {
    format!("{NAME}/{VERSION}")
}
