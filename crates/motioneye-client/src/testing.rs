//! Test utilities for motioneye-client
//!
//! Runs an axum router on an ephemeral local port and provides a client
//! pointed at it.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::{ClientConfig, MotionEyeClient, Result};

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: MotionEyeClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Start a server with a default-credential client
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::get, Json, Router};
    /// use motioneye_client::testing::TestServer;
    ///
    /// let router = Router::new().route("/manifest.json", get(|| async { Json(manifest) }));
    /// let server = TestServer::start(router).await?;
    /// let manifest = server.client.get_manifest().await?;
    /// ```
    pub async fn start(router: axum::Router) -> Result<Self> {
        Self::start_with(router, |config| config).await
    }

    /// Start a server; `configure` adjusts the client configuration (e.g.
    /// credentials) before the client is built.
    pub async fn start_with<F>(router: axum::Router, configure: F) -> Result<Self>
    where
        F: FnOnce(ClientConfig) -> ClientConfig,
    {
        let (addr, shutdown_tx, handle) = serve(router).await?;
        let config = configure(ClientConfig::new(format!("http://{}/", addr)));
        let client = MotionEyeClient::with_config(config)?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Root URL of the fake motionEye server, with a trailing slash
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Client pointed at the fake server
    pub fn client(&self) -> &MotionEyeClient {
        &self.client
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn serve(
    router: axum::Router,
) -> Result<(
    SocketAddr,
    tokio::sync::oneshot::Sender<()>,
    tokio::task::JoinHandle<()>,
)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| crate::MotionEyeClientError::Connection(e.to_string()))?;
    let addr = listener
        .local_addr()
        .map_err(|e| crate::MotionEyeClientError::Connection(e.to_string()))?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    // Let the accept loop start before handing out the address
    tokio::time::sleep(Duration::from_millis(10)).await;

    Ok((addr, shutdown_tx, handle))
}

/// Reserve a local port with nothing listening on it
pub async fn unused_local_addr() -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    listener.local_addr()
}
