//! Dependency wiring shared by the binary and the integration tests.

use std::sync::Arc;

use irori_shared::time::Clock;

use crate::{
    config::ChatConfig,
    domain::{ConnectionRegistry, MessageLog, MessagePusher, ObjectStore},
    infrastructure::{
        repository::{TableConnectionRepository, TableMessageRepository},
        table_store::TableStore,
    },
    ui::{Server, Triggers},
    usecase::{
        CleanupConnectionsUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetMessageHistoryUseCase, IngestMediaUseCase, SendMessageUseCase,
    },
};

/// Everything the server needs, built from one configuration
pub struct App {
    pub registry: Arc<ConnectionRegistry>,
    pub message_log: Arc<MessageLog>,
    pub triggers: Arc<Triggers>,
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub get_message_history_usecase: Arc<GetMessageHistoryUseCase>,
    cleanup_interval: Option<std::time::Duration>,
}

impl App {
    /// Wire domain services and use cases on top of the given adapters
    ///
    /// # Arguments
    ///
    /// * `config` - validated configuration
    /// * `table_store` - holds the connections and messages tables
    /// * `object_store` - destination of uploaded images
    /// * `message_pusher` - push channel to connected clients
    /// * `clock` - source of every timestamp
    pub fn new(
        config: &ChatConfig,
        table_store: Arc<dyn TableStore>,
        object_store: Arc<dyn ObjectStore>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        // 1. Domain services
        let registry = Arc::new(ConnectionRegistry::new(
            Arc::new(TableConnectionRepository::new(
                table_store.clone(),
                config.connection_table.clone(),
            )),
            clock.clone(),
            config.connection_limit,
        ));
        let message_log = Arc::new(MessageLog::new(
            Arc::new(TableMessageRepository::new(
                table_store,
                config.message_table.clone(),
            )),
            clock.clone(),
            config.message_limit,
        ));

        // 2. UseCases
        let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        ));
        let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        ));
        let ingest_media_usecase = Arc::new(IngestMediaUseCase::new(
            object_store,
            clock,
            config.bucket.clone(),
            config.region.clone(),
        ));
        let send_message_usecase = Arc::new(SendMessageUseCase::new(
            registry.clone(),
            message_log.clone(),
            ingest_media_usecase,
            message_pusher,
        ));
        let cleanup_connections_usecase = Arc::new(CleanupConnectionsUseCase::with_stale_after(
            registry.clone(),
            config.stale_after_chrono(),
        ));
        let get_message_history_usecase = Arc::new(GetMessageHistoryUseCase::new(
            message_log.clone(),
            &config.bucket,
        ));

        // 3. Trigger surface
        let triggers = Arc::new(Triggers::new(
            connect_participant_usecase.clone(),
            disconnect_participant_usecase,
            send_message_usecase,
            cleanup_connections_usecase,
        ));

        Self {
            registry,
            message_log,
            triggers,
            connect_participant_usecase,
            get_message_history_usecase,
            cleanup_interval: config.cleanup_interval,
        }
    }

    pub fn into_server(self) -> Server {
        let server = Server::new(
            self.triggers,
            self.get_message_history_usecase,
        );
        match self.cleanup_interval {
            Some(interval) => server.with_cleanup_interval(interval),
            None => server,
        }
    }
}
