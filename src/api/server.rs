//! HTTP server lifecycle.
//!
//! Bind → spawn background task → return handle with shutdown channel.
//! The blocking variant [`serve`] is what `main` uses; [`start_server_on`]
//! returns a handle so tests can drive a real listener and tear it down.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::routes::detection_router;
use crate::api::types::ApiContext;
use crate::config;

/// Handle to a running detection server.
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ServerHandle {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("server shutdown signal sent");
        }
    }
}

/// Bind and serve until the process is interrupted.
pub async fn serve(ctx: ApiContext, bind: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, version = config::APP_VERSION, "detection server started");

    let app = detection_router(ctx);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("interrupt received, shutting down");
        })
        .await
}

/// Start the server on a specific address in a background task.
pub async fn start_server_on(
    ctx: ApiContext,
    bind: SocketAddr,
) -> Result<ServerHandle, std::io::Error> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "detection server binding");

    let app = detection_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("detection server error: {e}");
        }

        tracing::info!("detection server stopped");
    });

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}
