//! HTTP server lifecycle.
//!
//! Binds the listener, serves the router on a background task and stops
//! gracefully when the cancellation token fires.

use axum::Router;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a running server.
pub struct ServerHandle {
    /// The address actually bound (useful when port 0 was requested).
    pub local_addr: SocketAddr,
    cancel_token: CancellationToken,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Stop accepting connections and wait up to `timeout` for in-flight
    /// requests to finish.
    ///
    /// # Returns
    /// `true` if the server drained within the timeout.
    pub async fn shutdown(self, timeout: std::time::Duration) -> bool {
        self.cancel_token.cancel();

        match tokio::time::timeout(timeout, self.task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                log::error!("[server] Server task failed: {}", e);
                false
            }
            Err(_) => {
                log::warn!("[server] Shutdown timed out after {:?}", timeout);
                false
            }
        }
    }
}

/// Start serving `app` on `addr`.
///
/// # Errors
/// Returns an error if the address cannot be bound.
pub async fn start(addr: SocketAddr, app: Router) -> std::io::Result<ServerHandle> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    log::info!("[server] Listening on http://{}", local_addr);

    let cancel_token = CancellationToken::new();
    let cancel_clone = cancel_token.clone();

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            cancel_clone.cancelled().await;
        });

        if let Err(e) = server.await {
            log::error!("[server] Server error: {}", e);
        }

        log::info!("[server] Server stopped");
    });

    Ok(ServerHandle {
        local_addr,
        cancel_token,
        task,
    })
}
