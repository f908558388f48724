use crate::config::RelayConfig;
use crate::room::RoomManager;
use crate::signaling::{SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const STOP_GRACE: Duration = Duration::from_secs(2);

pub fn router(service: SignalingService) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(service)
}

/// Runs the relay until Ctrl-C.
pub async fn serve(config: RelayConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind relay on {}", config.bind))?;
    info!("Signaling relay listening on ws://{}/ws", listener.local_addr()?);

    let app = router(SignalingService::new(config));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down relay");
        })
        .await
        .context("Relay server error")?;

    Ok(())
}

/// Handle to a relay started with [`spawn`].
pub struct RelayHandle {
    addr: SocketAddr,
    service: SignalingService,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RelayHandle {
    /// Actual bound address; useful when binding port 0.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signaling URL clients should dial, without the room parameter.
    pub fn signal_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn rooms(&self) -> &RoomManager {
        self.service.rooms()
    }

    /// Stops accepting connections and waits briefly for the server task.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match tokio::time::timeout(STOP_GRACE, &mut self.task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Relay task ended abnormally: {}", e),
            Err(_) => {
                warn!("Relay did not drain within {:?}, aborting", STOP_GRACE);
                self.task.abort();
            }
        }
    }
}

/// Starts the relay on a background task and returns once it is listening.
pub async fn spawn(config: RelayConfig) -> Result<RelayHandle> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind relay on {}", config.bind))?;
    let addr = listener.local_addr()?;

    let service = SignalingService::new(config);
    let app = router(service.clone());
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
        if let Err(e) = result {
            error!("Relay server error: {}", e);
        }
    });
    info!("Signaling relay listening on ws://{}/ws", addr);

    Ok(RelayHandle {
        addr,
        service,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}
