//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::gateway::WebSocketGateway,
    usecase::{DispatchControlUseCase, InputCollector, ListRoomsUseCase, ManageLifecycleUseCase},
};

use super::{
    handler::{gateway_handler, get_guild_rooms, health_check},
    signal::shutdown_signal,
    state::AppState,
};

/// TempVoice bot server
///
/// Accepts the gateway bridge connection and serves the HTTP API.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     gateway,
///     lifecycle_usecase,
///     dispatch_usecase,
///     collector,
///     list_rooms_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(
        gateway: Arc<WebSocketGateway>,
        lifecycle_usecase: Arc<ManageLifecycleUseCase>,
        dispatch_usecase: Arc<DispatchControlUseCase>,
        collector: Arc<InputCollector>,
        list_rooms_usecase: Arc<ListRoomsUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                gateway,
                lifecycle_usecase,
                dispatch_usecase,
                collector,
                list_rooms_usecase,
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            // ゲートウェイブリッジ（WebSocket）
            .route("/gateway", get(gateway_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/guilds/{guild_id}/rooms", get(get_guild_rooms))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to `host:port` and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("TempVoice bot listening on {}", listener.local_addr()?);
        tracing::info!("Gateway bridge endpoint: ws://{}/gateway", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
