//! ConnectionRegistry
//!
//! 上限付きで参加者を受け入れ、削除し、古くなった接続を掃除します。
//!
//! ## 並行性
//!
//! 件数の確認と追加はアトミックではありません（check-then-act）。
//! 同時に受け入れ処理が走ると、合計で上限を超えることがあります。

use std::sync::Arc;

use chrono::Duration;
use irori_shared::time::{Clock, to_compact_timestamp};

use crate::domain::{
    Color, Connection, ConnectionId, ConnectionRepository, RegistryError, RepositoryError,
    Timestamp,
};

/// 掃除の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// この時刻以前に作成された接続が対象
    pub cutoff: Timestamp,
    pub removed: usize,
    pub failed: usize,
}

pub struct ConnectionRegistry {
    repository: Arc<dyn ConnectionRepository>,
    clock: Arc<dyn Clock>,
    limit: usize,
}

impl ConnectionRegistry {
    /// 新しい ConnectionRegistry を作成
    ///
    /// # Arguments
    ///
    /// * `repository` - 接続テーブル
    /// * `clock` - 接続時刻の取得元
    /// * `limit` - 同時接続数の上限
    pub fn new(
        repository: Arc<dyn ConnectionRepository>,
        clock: Arc<dyn Clock>,
        limit: usize,
    ) -> Self {
        Self {
            repository,
            clock,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 接続を受け入れる
    ///
    /// 現在の接続数が上限未満なら、接続時刻と導出した色で登録する。
    pub async fn admit(&self, id: ConnectionId) -> Result<Connection, RegistryError> {
        let count = self.repository.count().await?;
        if count >= self.limit {
            return Err(RegistryError::CapacityExceeded { limit: self.limit });
        }

        let connection = Connection::admit(id, Timestamp::new(self.clock.now_compact()));
        self.repository.insert(connection.clone()).await?;
        tracing::debug!(
            "Admitted connection '{}' ({} of {})",
            connection.id,
            count + 1,
            self.limit
        );

        Ok(connection)
    }

    /// 接続を削除（存在しなくてもエラーにしない）
    pub async fn remove(&self, id: &ConnectionId) -> Result<(), RepositoryError> {
        self.repository.remove(id).await
    }

    pub async fn count(&self) -> Result<usize, RepositoryError> {
        self.repository.count().await
    }

    /// 接続の色を取得（見つからなければ空の色）
    pub async fn color_of(&self, id: &ConnectionId) -> Result<Color, RepositoryError> {
        let color = self
            .repository
            .find(id)
            .await?
            .map(|connection| connection.color)
            .unwrap_or_else(Color::unknown);
        Ok(color)
    }

    /// 全ての接続（スキャン順）
    pub async fn list(&self) -> Result<Vec<Connection>, RepositoryError> {
        self.repository.list().await
    }

    /// `max_age` より古い接続を削除する
    ///
    /// カットオフと同時刻に作成された接続も削除対象。個々の削除の失敗は
    /// ログに残して続行する。
    pub async fn sweep(&self, max_age: Duration) -> Result<SweepReport, RepositoryError> {
        let cutoff = Timestamp::new(to_compact_timestamp(&(self.clock.now() - max_age)));
        let connections = self.repository.list().await?;

        let mut report = SweepReport {
            cutoff,
            removed: 0,
            failed: 0,
        };
        for connection in connections.iter().filter(|c| c.is_stale(cutoff)) {
            match self.repository.remove(&connection.id).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    tracing::warn!("Failed to remove stale connection '{}': {}", connection.id, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        repository::TableConnectionRepository, table_store::InMemoryTableStore,
    };
    use irori_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 上限付きの受け入れ（上限 + 1 件目が失敗する）
    // - 色の導出と取得
    // - 削除の冪等性
    // - 古い接続の掃除（カットオフ境界を含む）
    // ========================================

    fn create_test_registry(limit: usize) -> (ConnectionRegistry, Arc<FixedClock>) {
        let store = Arc::new(InMemoryTableStore::with_tables([("connections", "connectionId")]));
        let repository = Arc::new(TableConnectionRepository::new(store, "connections"));
        let clock = Arc::new(FixedClock::from_compact(20240101120000123));
        (
            ConnectionRegistry::new(repository, clock.clone(), limit),
            clock,
        )
    }

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_admit_success() {
        // テスト項目: 上限未満なら接続時刻と導出した色で登録される
        // given (前提条件):
        let (registry, _clock) = create_test_registry(2);

        // when (操作):
        let connection = registry.admit(id("alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(connection.created_at, Timestamp::new(20240101120000123));
        assert_eq!(connection.color.as_str(), "00c07b");
        assert_eq!(registry.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_admit_capacity_exceeded() {
        // テスト項目: 上限 + 1 件目の受け入れは失敗し、接続数は上限を超えない
        // given (前提条件):
        let (registry, clock) = create_test_registry(2);
        registry.admit(id("alice")).await.unwrap();
        clock.advance(Duration::milliseconds(1));
        registry.admit(id("bob")).await.unwrap();

        // when (操作):
        let result = registry.admit(id("charlie")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::CapacityExceeded { limit: 2 }));
        assert_eq!(registry.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_admit_after_remove_frees_capacity() {
        // テスト項目: 削除で空きができれば再び受け入れられる
        // given (前提条件):
        let (registry, _clock) = create_test_registry(1);
        registry.admit(id("alice")).await.unwrap();
        registry.remove(&id("alice")).await.unwrap();

        // when (操作):
        let result = registry.admit(id("bob")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(registry.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_color_of_known_and_unknown() {
        // テスト項目: 登録済みの接続は色を返し、未登録なら空の色を返す
        // given (前提条件):
        let (registry, _clock) = create_test_registry(5);
        registry.admit(id("alice")).await.unwrap();

        // when (操作):
        let known = registry.color_of(&id("alice")).await.unwrap();
        let unknown = registry.color_of(&id("ghost")).await.unwrap();

        // then (期待する結果):
        assert_eq!(known.as_str(), "00c07b");
        assert_eq!(unknown.as_str(), "");
    }

    #[tokio::test]
    async fn test_remove_twice_is_noop() {
        // テスト項目: 同じ ID を 2 回削除しても 2 回目はエラーにならない
        // given (前提条件):
        let (registry, _clock) = create_test_registry(5);
        registry.admit(id("alice")).await.unwrap();

        // when (操作):
        let first = registry.remove(&id("alice")).await;
        let second = registry.remove(&id("alice")).await;

        // then (期待する結果):
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(registry.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_removes_connections_at_or_before_cutoff() {
        // テスト項目: カットオフ以前（同時刻を含む）の接続だけが削除される
        // given (前提条件):
        let (registry, clock) = create_test_registry(10);
        // 10:00:00.000 に作成（カットオフちょうど）
        clock.set(FixedClock::from_compact(20240101100000000).now());
        registry.admit(id("at-cutoff")).await.unwrap();
        // 09:59:59.999 に作成（カットオフより古い）
        clock.set(FixedClock::from_compact(20240101095959999).now());
        registry.admit(id("older")).await.unwrap();
        // 10:00:00.001 に作成（カットオフより新しい）
        clock.set(FixedClock::from_compact(20240101100000001).now());
        registry.admit(id("newer")).await.unwrap();

        // when (操作): 12:00:00.000 に 2 時間で掃除
        clock.set(FixedClock::from_compact(20240101120000000).now());
        let report = registry.sweep(Duration::seconds(7200)).await.unwrap();

        // then (期待する結果):
        assert_eq!(report.cutoff, Timestamp::new(20240101100000000));
        assert_eq!(report.removed, 2);
        assert_eq!(report.failed, 0);
        let remaining = registry.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id.as_str(), "newer");
    }

    #[tokio::test]
    async fn test_sweep_on_empty_registry() {
        // テスト項目: 接続がなくても掃除はエラーにならない
        // given (前提条件):
        let (registry, _clock) = create_test_registry(10);

        // when (操作):
        let report = registry.sweep(Duration::hours(2)).await.unwrap();

        // then (期待する結果):
        assert_eq!(report.removed, 0);
    }
}
