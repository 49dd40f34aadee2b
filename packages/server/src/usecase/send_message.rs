//! UseCase: メッセージ送信処理（ブロードキャスト）
//!
//! ## 処理の流れ
//!
//! 1. 本文 `{"image"?: string, "text"?: string}` を解釈する
//! 2. 画像があれば取り込んで公開 URL を本文とする。なければテキストを HTML エスケープする
//! 3. 送信者の色を引き、メッセージログに保存する
//! 4. 生きている接続に配信する（テキストは送信者に返さない。画像は送信者にも返す）
//! 5. 配信に失敗した接続を登録簿から外す
//!
//! 1〜3 の失敗は呼び出し元へのエラーになります。4〜5 は失敗してもログに残すだけです。
//! 配信は 1 接続につき 1 回だけ、スキャン順に逐次行います。

use std::sync::Arc;

use crate::{
    domain::{
        Color, ConnectionId, ConnectionRegistry, Message, MessageLog, MessagePushError,
        MessagePusher,
    },
    infrastructure::dto::websocket::{PublishPayload, SendRequest},
};

use super::{
    error::{SendMessageError, ValidationError},
    ingest_media::IngestMediaUseCase,
};

/// 1 接続への配信結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub target: ConnectionId,
    pub outcome: Result<(), MessagePushError>,
}

impl DeliveryReport {
    pub fn is_lost(&self) -> bool {
        self.outcome.is_err()
    }
}

/// ブロードキャストの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// 保存されたメッセージ
    pub message: Message,
    pub reports: Vec<DeliveryReport>,
    /// 配信に失敗して登録簿から外した接続
    pub pruned: Vec<ConnectionId>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    registry: Arc<ConnectionRegistry>,
    message_log: Arc<MessageLog>,
    ingest_media: Arc<IngestMediaUseCase>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        message_log: Arc<MessageLog>,
        ingest_media: Arc<IngestMediaUseCase>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_log,
            ingest_media,
            message_pusher,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者の接続 ID
    /// * `body` - クライアントから届いた本文（JSON）
    pub async fn execute(
        &self,
        sender_id: &ConnectionId,
        body: &str,
    ) -> Result<BroadcastOutcome, SendMessageError> {
        // 1. 本文を解釈
        let request: SendRequest = serde_json::from_str(body)
            .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;
        let image = request.image.unwrap_or_default();
        let text = request.text.unwrap_or_default();

        // 2. 本文を決める
        let (data, is_text) = if image.is_empty() {
            (escape_html(&text), true)
        } else {
            (self.ingest_media.execute(&text, &image).await?, false)
        };

        // 3. 保存
        let color = self.registry.color_of(sender_id).await?;
        let message = self.message_log.save_message(&data, &color).await?;
        let payload = publish_payload(&data, &color)?;

        // 4. 配信
        let targets = match self.registry.list().await {
            Ok(connections) => connections
                .into_iter()
                .map(|connection| connection.id)
                .filter(|id| !is_text || id != sender_id)
                .collect(),
            Err(e) => {
                tracing::warn!("Failed to list connections, skipping fan-out: {}", e);
                Vec::new()
            }
        };
        let reports = self.fan_out(&targets, &payload).await;

        // 5. 配信に失敗した接続を外す
        let pruned = self.prune_lost(&reports).await;

        Ok(BroadcastOutcome {
            message,
            reports,
            pruned,
        })
    }

    /// 各接続に 1 回ずつ配信し、結果を返す
    pub async fn fan_out(&self, targets: &[ConnectionId], payload: &str) -> Vec<DeliveryReport> {
        let mut reports = Vec::with_capacity(targets.len());
        for target in targets {
            let outcome = self.message_pusher.push_to(target, payload).await;
            if let Err(e) = &outcome {
                tracing::warn!("Failed to deliver to '{}': {}", target, e);
            }
            reports.push(DeliveryReport {
                target: target.clone(),
                outcome,
            });
        }
        reports
    }

    /// 配信に失敗した接続を登録簿から外す
    ///
    /// 削除の失敗はログに残すだけ。外した接続の ID を返す。
    pub async fn prune_lost(&self, reports: &[DeliveryReport]) -> Vec<ConnectionId> {
        let mut pruned = Vec::new();
        for report in reports.iter().filter(|report| report.is_lost()) {
            self.message_pusher.unregister_client(&report.target).await;
            match self.registry.remove(&report.target).await {
                Ok(()) => {
                    tracing::info!("Pruned unreachable connection '{}'", report.target);
                    pruned.push(report.target.clone());
                }
                Err(e) => {
                    tracing::warn!("Failed to prune connection '{}': {}", report.target, e);
                }
            }
        }
        pruned
    }
}

fn publish_payload(data: &str, color: &Color) -> Result<String, SendMessageError> {
    let payload = PublishPayload {
        data: data.to_string(),
        color: color.as_str().to_string(),
    };
    serde_json::to_string(&payload).map_err(|e| SendMessageError::Upstream(e.to_string()))
}

/// `& < > " '` をエスケープする
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
