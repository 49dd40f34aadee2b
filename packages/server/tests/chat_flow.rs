//! Integration tests driving the trigger surface with in-memory adapters.

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use chrono::Duration;
use irori_server::{
    app::App,
    config::ChatConfig,
    domain::{ConnectionId, PusherChannel},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, object_store::InMemoryObjectStore,
        table_store::InMemoryTableStore,
    },
};
use irori_shared::time::FixedClock;
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};

/// Helper bundling the wired application and its fake adapters
struct TestApp {
    app: App,
    clock: Arc<FixedClock>,
    object_store: Arc<InMemoryObjectStore>,
}

impl TestApp {
    fn start(connection_limit: usize, message_limit: usize) -> Self {
        let config = ChatConfig {
            connection_limit,
            message_limit,
            bucket: "chat-images".to_string(),
            region: "ap-northeast-1".to_string(),
            cleanup_interval: None,
            ..ChatConfig::default()
        };
        let table_store = Arc::new(InMemoryTableStore::with_tables([
            ("connections", "connectionId"),
            ("messages", "id"),
        ]));
        let object_store = Arc::new(InMemoryObjectStore::new());
        let clock = Arc::new(FixedClock::from_compact(20240101120000123));
        let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::<String, PusherChannel>::new(),
        ))));

        let app = App::new(
            &config,
            table_store,
            object_store.clone(),
            message_pusher,
            clock.clone(),
        );
        Self {
            app,
            clock,
            object_store,
        }
    }

    /// Open a connection the way the WebSocket front door does
    async fn connect(&self, id: &str) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        let response = self.app.triggers.open(&connection_id(id), "127.0.0.1", tx).await;
        assert_eq!(response.status, 200, "connect '{id}' failed: {}", response.body);
        self.clock.advance(Duration::milliseconds(1));
        rx
    }

    async fn registered_ids(&self) -> Vec<String> {
        self.app
            .registry
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id.into_string())
            .collect()
    }
}

fn connection_id(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

fn received(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(serde_json::from_str(&message).unwrap());
    }
    messages
}

#[tokio::test]
async fn test_text_broadcast_skips_sender() {
    // テスト項目: テキストは送信者以外の全員に届く
    // given (前提条件):
    let app = TestApp::start(10, 10);
    let mut alice = app.connect("alice").await;
    let mut bob = app.connect("bob").await;
    let mut charlie = app.connect("charlie").await;

    // when (操作):
    let response = app.app.triggers.send("alice", r#"{"text":"hi"}"#).await;

    // then (期待する結果):
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "");
    let expected = json!({"data": "hi", "color": "00c07b"});
    assert!(received(&mut alice).is_empty());
    assert_eq!(received(&mut bob), vec![expected.clone()]);
    assert_eq!(received(&mut charlie), vec![expected]);
}

#[tokio::test]
async fn test_image_broadcast_reaches_sender() {
    // テスト項目: 画像は送信者を含む全員に公開 URL として届く
    // given (前提条件):
    let app = TestApp::start(10, 10);
    let mut alice = app.connect("alice").await;
    let mut bob = app.connect("bob").await;

    // when (操作):
    let response = app
        .app
        .triggers
        .send(
            "alice",
            r#"{"image":"data:image/gif;base64,R0lGODlh","text":"wave.gif"}"#,
        )
        .await;

    // then (期待する結果):
    assert_eq!(response.status, 200);
    let url = "https://chat-images.s3-ap-northeast-1.amazonaws.com/wave20240101120000125.gif";
    let expected = json!({"data": url, "color": "00c07b"});
    assert_eq!(received(&mut alice), vec![expected.clone()]);
    assert_eq!(received(&mut bob), vec![expected]);
    assert_eq!(
        app.object_store.keys().await,
        vec!["wave20240101120000125.gif".to_string()]
    );
}

#[tokio::test]
async fn test_connect_over_capacity_returns_500() {
    // テスト項目: 上限を超えた接続は 500 と {"message"} で拒否される
    // given (前提条件):
    let app = TestApp::start(1, 10);
    let _alice = app.connect("alice").await;

    // when (操作):
    let response = app.app.triggers.connect("bob", "127.0.0.1").await;

    // then (期待する結果):
    assert_eq!(response.status, 500);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body, json!({"message": "too many connections (limit: 1)"}));
    assert_eq!(app.app.registry.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_extension_returns_500() {
    // テスト項目: `.PNG` の画像は 500 で拒否され、何も配信されない
    // given (前提条件):
    let app = TestApp::start(10, 10);
    let mut bob = app.connect("bob").await;
    let _alice = app.connect("alice").await;

    // when (操作):
    let response = app
        .app
        .triggers
        .send(
            "alice",
            r#"{"image":"data:image/png;base64,AQID","text":"x.PNG"}"#,
        )
        .await;

    // then (期待する結果):
    assert_eq!(response.status, 500);
    assert!(response.body.contains("unsupported image extension"));
    assert!(received(&mut bob).is_empty());
    assert_eq!(app.app.message_log.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_disconnected_receiver_is_pruned() {
    // テスト項目: 受信できなくなった接続は配信の後に登録簿から外れる
    // given (前提条件):
    let app = TestApp::start(10, 10);
    let _alice = app.connect("alice").await;
    let bob = app.connect("bob").await;
    let mut charlie = app.connect("charlie").await;
    drop(bob);

    // when (操作):
    let response = app.app.triggers.send("alice", r#"{"text":"hi"}"#).await;

    // then (期待する結果):
    assert_eq!(response.status, 200);
    assert_eq!(received(&mut charlie).len(), 1);
    let ids = app.registered_ids().await;
    assert_eq!(ids, vec!["alice", "charlie"]);
}

#[tokio::test]
async fn test_message_log_rotates_at_capacity() {
    // テスト項目: メッセージ数の上限を超えると最も古いメッセージが置き換わる
    // given (前提条件):
    let app = TestApp::start(10, 2);
    let _alice = app.connect("alice").await;
    for text in ["one", "two", "three"] {
        let body = json!({ "text": text }).to_string();
        assert_eq!(app.app.triggers.send("alice", &body).await.status, 200);
        app.clock.advance(Duration::milliseconds(1));
    }

    // when (操作):
    let history = app.app.get_message_history_usecase.execute().await.unwrap();

    // then (期待する結果):
    assert_eq!(history.max, 2);
    let messages = app.app.message_log.list_ordered_by_time().await.unwrap();
    let data: Vec<(i64, String)> = messages
        .into_iter()
        .map(|m| (m.id.value(), m.data))
        .collect();
    assert_eq!(
        data,
        vec![(1, "two".to_string()), (0, "three".to_string())]
    );
}

#[tokio::test]
async fn test_cleanup_sweeps_stale_connections() {
    // テスト項目: 2 時間以上前の接続が掃除される
    // given (前提条件):
    let app = TestApp::start(10, 10);
    let _old = app.connect("old").await;
    app.clock.advance(Duration::hours(1));
    let _recent = app.connect("recent").await;
    app.clock.advance(Duration::hours(1));

    // when (操作):
    app.app.triggers.cleanup().await;

    // then (期待する結果):
    let ids = app.registered_ids().await;
    assert_eq!(ids, vec!["recent"]);
}

#[tokio::test]
async fn test_disconnect_twice_is_ok() {
    // テスト項目: 同じ接続を 2 回切断しても成功する
    // given (前提条件):
    let app = TestApp::start(10, 10);
    let _alice = app.connect("alice").await;

    // when (操作):
    let first = app.app.triggers.disconnect("alice").await;
    let second = app.app.triggers.disconnect("alice").await;

    // then (期待する結果):
    assert_eq!(first.status, 200);
    assert_eq!(second.status, 200);
    assert_eq!(app.app.registry.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_http_endpoints() {
    // テスト項目: HTTP のトリガーと履歴 API が動作する
    // given (前提条件):
    let app = TestApp::start(10, 10);
    let router = app.app.into_server().router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    let client = reqwest::Client::new();
    let base = format!("http://{addr}");

    // when (操作):
    let health: Value = client
        .get(format!("{base}/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let connect = client
        .post(format!("{base}/triggers/connect/alice"))
        .header("x-forwarded-for", "203.0.113.7")
        .send()
        .await
        .unwrap();
    let send = client
        .post(format!("{base}/triggers/send/alice"))
        .body(r#"{"text":"<hello>"}"#)
        .send()
        .await
        .unwrap();
    let malformed = client
        .post(format!("{base}/triggers/send/alice"))
        .body("not json")
        .send()
        .await
        .unwrap();
    let history: Value = client
        .get(format!("{base}/api/messages"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    assert_eq!(connect.status().as_u16(), 200);
    assert_eq!(send.status().as_u16(), 200);
    assert_eq!(malformed.status().as_u16(), 500);
    let error: Value = malformed.json().await.unwrap();
    assert!(error["message"].as_str().unwrap().starts_with("malformed message body"));
    assert_eq!(history["max"], json!(10));
    assert_eq!(history["messages"][0]["text"], json!("&lt;hello&gt;"));
    assert_eq!(history["messages"][0]["imageUrl"], json!(""));
    assert_eq!(history["messages"][0]["color"], json!("00c07b"));
}

#[tokio::test]
async fn test_send_during_admission_keeps_new_connection() {
    // テスト項目: チャンネル登録と受け付けの間に配信が走っても、新しい接続は外されない
    // given (前提条件): bob はチャンネルだけ登録済みで、まだ受け付けられていない
    let app = TestApp::start(10, 10);
    let _alice = app.connect("alice").await;
    let (tx, mut bob) = mpsc::unbounded_channel();
    app.app
        .connect_participant_usecase
        .attach_channel(connection_id("bob"), tx)
        .await;
    assert_eq!(app.app.triggers.send("alice", r#"{"text":"hi"}"#).await.status, 200);

    // when (操作): bob が受け付けられた後に再び配信する
    assert_eq!(app.app.triggers.connect("bob", "127.0.0.1").await.status, 200);
    let response = app.app.triggers.send("alice", r#"{"text":"again"}"#).await;

    // then (期待する結果):
    assert_eq!(response.status, 200);
    assert_eq!(app.registered_ids().await, vec!["alice", "bob"]);
    assert_eq!(
        received(&mut bob),
        vec![json!({"data": "again", "color": "00c07b"})]
    );
}

#[tokio::test]
async fn test_rejected_open_detaches_channel() {
    // テスト項目: 受け付けを拒否された接続のチャンネルは外される
    // given (前提条件):
    let app = TestApp::start(1, 10);
    let _alice = app.connect("alice").await;
    let (tx, mut bob) = mpsc::unbounded_channel();

    // when (操作):
    let response = app.app.triggers.open(&connection_id("bob"), "127.0.0.1", tx).await;

    // then (期待する結果):
    assert_eq!(response.status, 500);
    assert_eq!(app.registered_ids().await, vec!["alice"]);
    assert_eq!(bob.recv().await, None);
}
