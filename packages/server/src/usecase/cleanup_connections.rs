//! UseCase: 古い接続の掃除
//!
//! 定期的に呼ばれ、一定時間より前に作成された接続を登録簿から外します。
//! 状態を持たないので、何度呼んでも同じ結果になります。

use std::sync::Arc;

use chrono::Duration;

use crate::domain::{ConnectionRegistry, SweepReport};

use super::error::CleanupError;

/// 既定の閾値（2 時間）
pub const DEFAULT_STALE_AFTER_SECS: i64 = 7200;

/// 古い接続を掃除するユースケース
pub struct CleanupConnectionsUseCase {
    registry: Arc<ConnectionRegistry>,
    stale_after: Duration,
}

impl CleanupConnectionsUseCase {
    /// 既定の閾値で作成
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self::with_stale_after(registry, Duration::seconds(DEFAULT_STALE_AFTER_SECS))
    }

    pub fn with_stale_after(registry: Arc<ConnectionRegistry>, stale_after: Duration) -> Self {
        Self {
            registry,
            stale_after,
        }
    }

    pub async fn execute(&self) -> Result<SweepReport, CleanupError> {
        let report = self.registry.sweep(self.stale_after).await?;
        tracing::info!(
            "Swept {} stale connection(s) created at or before {} ({} failed)",
            report.removed,
            report.cutoff.value(),
            report.failed
        );
        Ok(report)
    }
}
