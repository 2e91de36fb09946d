// Build-time version from Cargo.toml

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// "docker-monitor v1.0.0"
pub fn version_line() -> String {
    format!("{} v{}", NAME, VERSION)
}
