//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;

use crate::{
    config::RelayConfig,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, ListParticipantsUseCase,
        MonitorLivenessUseCase, RelayMessageUseCase,
    },
};

use super::{
    handler::{disconnect_participant, health_check, list_participants, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket relay server
///
/// This struct encapsulates the server configuration and the use cases the
/// handlers dispatch to.
///
/// # Example
///
/// ```ignore
/// let server = agora_server::app::build_server(RelayConfig::default(), Arc::new(SystemClock));
/// server.run().await?;
/// ```
pub struct Server {
    config: RelayConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `config` - Bind address and liveness timing
    /// * `connect_participant_usecase` - UseCase for participant connection
    /// * `disconnect_participant_usecase` - UseCase for participant disconnection
    /// * `relay_message_usecase` - UseCase for message relaying
    /// * `list_participants_usecase` - UseCase for the presence listing
    /// * `monitor_liveness_usecase` - UseCase for liveness probing and eviction
    pub fn new(
        config: RelayConfig,
        connect_participant_usecase: Arc<ConnectParticipantUseCase>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        list_participants_usecase: Arc<ListParticipantsUseCase>,
        monitor_liveness_usecase: Arc<MonitorLivenessUseCase>,
    ) -> Self {
        Self {
            config,
            state: Arc::new(AppState {
                connect_participant_usecase,
                disconnect_participant_usecase,
                relay_message_usecase,
                list_participants_usecase,
                monitor_liveness_usecase,
            }),
        }
    }

    /// Build the HTTP/WebSocket router
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/participants", get(list_participants))
            .route("/api/disconnect", post(disconnect_participant))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the relay server on the configured address until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address
    /// or if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// The liveness monitor runs for exactly as long as the server does.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Relay server listening on {}", listener.local_addr()?);

        let (monitor_shutdown_tx, monitor_shutdown_rx) = watch::channel(false);
        let monitor = self
            .state
            .monitor_liveness_usecase
            .clone()
            .spawn(self.config.ping_interval, monitor_shutdown_rx);

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await;

        // Stop the monitor even if serving failed
        let _ = monitor_shutdown_tx.send(true);
        if let Err(e) = monitor.await {
            tracing::warn!("Liveness monitor task ended abnormally: {}", e);
        }

        result?;
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
