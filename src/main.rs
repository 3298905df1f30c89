use tracing_subscriber::EnvFilter;

use carelink::api::server;
use carelink::api::types::ApiContext;
use carelink::bootstrap;
use carelink::config::Settings;
use carelink::db;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env();

    if let Some(parent) = settings.database_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!("cannot create data directory {}: {e}", parent.display());
            std::process::exit(1);
        }
    }

    let conn = match db::open_database(&settings.database_path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("cannot open database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = bootstrap::seed_admin(&conn, &settings.admin_email, &settings.admin_password) {
        tracing::error!("admin bootstrap failed: {e}");
        std::process::exit(1);
    }

    let ctx = ApiContext::new(conn);
    let api = match server::start(ctx, settings.bind_addr).await {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("cannot bind {}: {e}", settings.bind_addr);
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("signal handler failed: {e}");
    }
    api.shutdown().await;
}
