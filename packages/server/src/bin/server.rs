//! Irori broadcast chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin irori-server
//! cargo run --bin irori-server -- --host 0.0.0.0 --port 3000
//! OBJECT_STORE=s3 BUCKET_NAME=chat-images cargo run --bin irori-server
//! ```

use std::{collections::HashMap, sync::Arc, time::Duration};

use clap::Parser;
use irori_server::{
    app::App,
    config::{ChatConfig, ObjectStoreKind},
    domain::{MessagePusher, ObjectStore},
    infrastructure::{
        message_pusher::{HttpMessagePusher, WebSocketMessagePusher},
        object_store::{InMemoryObjectStore, S3ObjectStore, S3Settings},
        table_store::InMemoryTableStore,
    },
};
use irori_shared::{logger::setup_logger, time::SystemClock};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "irori-server")]
#[command(about = "Broadcast chat server with a bounded message log", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Maximum number of live connections
    #[arg(long, env = "LIMIT_CONNECTION_COUNT", default_value = "100")]
    limit_connection_count: usize,

    /// Maximum number of stored messages
    #[arg(long, env = "LIMIT_MESSAGE_COUNT", default_value = "50")]
    limit_message_count: usize,

    #[arg(long, env = "CONNECTION_TABLE_NAME", default_value = "connections")]
    connection_table_name: String,

    #[arg(long, env = "MESSAGE_TABLE_NAME", default_value = "messages")]
    message_table_name: String,

    /// Bucket receiving uploaded images
    #[arg(long, env = "BUCKET_NAME", default_value = "irori-images")]
    bucket_name: String,

    #[arg(long, env = "REGION", default_value = "ap-northeast-1")]
    region: String,

    /// Image storage backend: "memory" or "s3"
    #[arg(long, env = "OBJECT_STORE", default_value = "memory")]
    object_store: ObjectStoreKind,

    /// Custom endpoint for S3-compatible storage
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    aws_access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    aws_secret_access_key: Option<String>,

    /// Gateway management endpoint; when set, messages are pushed over HTTP
    #[arg(long, env = "PUSH_ENDPOINT")]
    push_endpoint: Option<String>,

    /// Seconds between stale-connection sweeps (0 disables the sweep)
    #[arg(long, env = "CLEANUP_INTERVAL_SECS", default_value = "3600")]
    cleanup_interval_secs: u64,

    /// Connections older than this many seconds are swept
    #[arg(long, env = "STALE_AFTER_SECS", default_value = "7200")]
    stale_after_secs: u64,
}

impl Args {
    fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            connection_limit: self.limit_connection_count,
            message_limit: self.limit_message_count,
            connection_table: self.connection_table_name.clone(),
            message_table: self.message_table_name.clone(),
            bucket: self.bucket_name.clone(),
            region: self.region.clone(),
            object_store: self.object_store,
            s3_endpoint: self.s3_endpoint.clone(),
            push_endpoint: self.push_endpoint.clone(),
            cleanup_interval: (self.cleanup_interval_secs > 0)
                .then(|| Duration::from_secs(self.cleanup_interval_secs)),
            stale_after: Duration::from_secs(self.stale_after_secs),
        }
    }
}

fn build_object_store(args: &Args, config: &ChatConfig) -> Result<Arc<dyn ObjectStore>, String> {
    match config.object_store {
        ObjectStoreKind::Memory => Ok(Arc::new(InMemoryObjectStore::new())),
        ObjectStoreKind::S3 => {
            let access_key_id = args
                .aws_access_key_id
                .clone()
                .ok_or("OBJECT_STORE=s3 requires AWS_ACCESS_KEY_ID")?;
            let secret_access_key = args
                .aws_secret_access_key
                .clone()
                .ok_or("OBJECT_STORE=s3 requires AWS_SECRET_ACCESS_KEY")?;
            Ok(Arc::new(S3ObjectStore::new(S3Settings {
                bucket: config.bucket.clone(),
                region: config.region.clone(),
                access_key_id,
                secret_access_key,
                endpoint: config.s3_endpoint.clone(),
            })))
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = match args.chat_config().validate() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Table store
    // 2. Object store
    // 3. MessagePusher
    // 4. Domain services, UseCases and triggers
    // 5. Server

    // 1. Create the table store (in-memory tables)
    let table_store = Arc::new(InMemoryTableStore::with_tables([
        (config.connection_table.as_str(), "connectionId"),
        (config.message_table.as_str(), "id"),
    ]));

    // 2. Create the object store
    let object_store = match build_object_store(&args, &config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 3. Create MessagePusher
    let message_pusher: Arc<dyn MessagePusher> = match &config.push_endpoint {
        Some(endpoint) => {
            tracing::info!("Pushing messages through gateway {}", endpoint);
            Arc::new(HttpMessagePusher::new(endpoint.clone()))
        }
        None => Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        )))),
    };

    // 4. Wire the application
    let app = App::new(
        &config,
        table_store,
        object_store,
        message_pusher,
        Arc::new(SystemClock),
    );
    tracing::info!(
        "Accepting up to {} connections, keeping the latest {} messages",
        config.connection_limit,
        config.message_limit
    );

    // 5. Run the server
    if let Err(e) = app.into_server().run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
