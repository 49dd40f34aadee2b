//! UseCase: 参加者切断処理
//!
//! 接続を登録簿から削除し、送信チャンネルの登録を解除します。
//! 存在しない接続の切断も成功として扱います。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, MessagePusher};

use super::error::DisconnectError;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(registry: Arc<ConnectionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 参加者切断を実行
    pub async fn execute(&self, connection_id: ConnectionId) -> Result<(), DisconnectError> {
        // 送信チャンネルは削除の成否に関わらず外す
        self.message_pusher.unregister_client(&connection_id).await;
        self.registry.remove(&connection_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::MockMessagePusher,
        infrastructure::{repository::TableConnectionRepository, table_store::InMemoryTableStore},
    };
    use irori_shared::time::FixedClock;

    fn create_test_registry(store: Arc<InMemoryTableStore>) -> Arc<ConnectionRegistry> {
        Arc::new(ConnectionRegistry::new(
            Arc::new(TableConnectionRepository::new(store, "connections")),
            Arc::new(FixedClock::from_compact(20240101120000123)),
            10,
        ))
    }

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_disconnect_participant_success() {
        // テスト項目: 切断すると登録簿から削除され、チャンネルの登録も解除される
        // given (前提条件):
        let registry = create_test_registry(Arc::new(InMemoryTableStore::with_tables([(
            "connections",
            "connectionId",
        )])));
        registry.admit(id("alice")).await.unwrap();
        registry.admit(id("bob")).await.unwrap();

        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_unregister_client()
            .withf(|client_id| client_id.as_str() == "alice")
            .times(1)
            .return_const(());
        let usecase = DisconnectParticipantUseCase::new(registry.clone(), Arc::new(pusher));

        // when (操作):
        let result = usecase.execute(id("alice")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let remaining = registry.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, id("bob"));
    }

    #[tokio::test]
    async fn test_disconnect_unknown_participant_is_ok() {
        // テスト項目: 存在しない接続の切断も成功する
        // given (前提条件):
        let registry = create_test_registry(Arc::new(InMemoryTableStore::with_tables([(
            "connections",
            "connectionId",
        )])));
        let mut pusher = MockMessagePusher::new();
        pusher.expect_unregister_client().return_const(());
        let usecase = DisconnectParticipantUseCase::new(registry, Arc::new(pusher));

        // when (操作):
        let result = usecase.execute(id("ghost")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_disconnect_store_unavailable() {
        // テスト項目: テーブルストアの障害は Upstream エラーになる
        // given (前提条件):
        let registry = create_test_registry(Arc::new(InMemoryTableStore::new()));
        let mut pusher = MockMessagePusher::new();
        pusher.expect_unregister_client().return_const(());
        let usecase = DisconnectParticipantUseCase::new(registry, Arc::new(pusher));

        // when (操作):
        let result = usecase.execute(id("alice")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(DisconnectError::Upstream(_))));
    }
}
