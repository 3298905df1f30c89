//! HTTP server lifecycle: bind, serve, shut down on signal.
//!
//! Pattern: bind -> spawn background task -> return a handle carrying
//! the bound address and a shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl ApiServer {
    /// Signal the server to stop accepting connections and wait for it
    /// to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
        tracing::info!("API server stopped");
    }
}

/// Bind and serve in a background task. Pass port 0 for an ephemeral
/// port (tests).
pub async fn start(ctx: ApiContext, addr: SocketAddr) -> std::io::Result<ApiServer> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    let app = api_router(ctx);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = server.await {
            tracing::error!("API server error: {e}");
        }
    });

    tracing::info!("API server listening on {bound}");
    Ok(ApiServer {
        addr: bound,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}
