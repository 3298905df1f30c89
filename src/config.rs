use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Carelink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Runtime settings, read once at startup.
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub admin_email: String,
    pub admin_password: String,
}

impl Settings {
    /// Environment first, sensible defaults second.
    ///
    /// `CARELINK_ADDR`, `CARELINK_DB`, `CARELINK_ADMIN_EMAIL` and
    /// `CARELINK_ADMIN_PASSWORD` override the defaults.
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("CARELINK_ADDR")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(|| DEFAULT_ADDR.parse().expect("valid default address"));
        let database_path = std::env::var("CARELINK_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());
        let admin_email = std::env::var("CARELINK_ADMIN_EMAIL")
            .unwrap_or_else(|_| "admin@carelink.local".to_string());
        let admin_password =
            std::env::var("CARELINK_ADMIN_PASSWORD").unwrap_or_else(|_| "changemenow".to_string());

        Self {
            bind_addr,
            database_path,
            admin_email,
            admin_password,
        }
    }
}

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("carelink")
}

fn default_database_path() -> PathBuf {
    app_data_dir().join("carelink.db")
}
