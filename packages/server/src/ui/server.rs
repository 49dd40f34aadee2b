//! Server execution logic.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::usecase::GetMessageHistoryUseCase;

use super::{
    handler::{
        get_messages, health_check, trigger_cleanup, trigger_connect, trigger_disconnect,
        trigger_send, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
    trigger::Triggers,
};

/// Broadcast chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(triggers, get_message_history_usecase)
///     .with_cleanup_interval(Duration::from_secs(3600));
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    triggers: Arc<Triggers>,
    get_message_history_usecase: Arc<GetMessageHistoryUseCase>,
    /// 古い接続を掃除する間隔（`None` なら定期実行しない）
    cleanup_interval: Option<Duration>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `triggers` - connect / disconnect / send / cleanup entry points
    /// * `get_message_history_usecase` - backs `GET /api/messages`
    pub fn new(
        triggers: Arc<Triggers>,
        get_message_history_usecase: Arc<GetMessageHistoryUseCase>,
    ) -> Self {
        Self {
            triggers,
            get_message_history_usecase,
            cleanup_interval: None,
        }
    }

    /// Run the cleanup trigger periodically while the server is up
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Build the router with every endpoint
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            triggers: self.triggers.clone(),
            get_message_history_usecase: self.get_message_history_usecase.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // 外部ゲートウェイ向けのトリガー
            .route("/triggers/connect/{connection_id}", post(trigger_connect))
            .route(
                "/triggers/disconnect/{connection_id}",
                post(trigger_disconnect),
            )
            .route("/triggers/send/{connection_id}", post(trigger_send))
            .route("/triggers/cleanup", post(trigger_cleanup))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/messages", get(get_messages))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let cleanup_task = self.cleanup_interval.map(|interval| {
            let triggers = self.triggers.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // the first tick completes immediately
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    triggers.cleanup().await;
                }
            })
        });

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        if let Some(task) = cleanup_task {
            task.abort();
        }
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
