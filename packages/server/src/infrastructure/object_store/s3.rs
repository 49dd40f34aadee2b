//! S3 ObjectStore 実装
//!
//! クライアントは最初のアップロード時に一度だけ作られ、以降は使い回されます。

use async_trait::async_trait;
use aws_sdk_s3::{
    Client as S3Client, Config as S3Config,
    config::{Credentials, Region},
    primitives::ByteStream,
    types::ObjectCannedAcl,
};
use tokio::sync::OnceCell;

use crate::domain::{ObjectStore, ObjectStoreError};

/// S3 クライアントの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// S3 互換ストレージを使う場合のエンドポイント（path-style でアクセスする）
    pub endpoint: Option<String>,
}

pub struct S3ObjectStore {
    settings: S3Settings,
    client: OnceCell<S3Client>,
}

impl S3ObjectStore {
    pub fn new(settings: S3Settings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.settings.bucket
    }

    async fn client(&self) -> &S3Client {
        self.client
            .get_or_init(|| async { build_client(&self.settings) })
            .await
    }
}

fn build_client(settings: &S3Settings) -> S3Client {
    let credentials = Credentials::new(
        settings.access_key_id.clone(),
        settings.secret_access_key.clone(),
        None,
        None,
        "irori",
    );
    let mut builder = S3Config::builder()
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials)
        .force_path_style(settings.endpoint.is_some());
    if let Some(endpoint) = settings.endpoint.clone() {
        builder = builder.endpoint_url(endpoint);
    }
    tracing::debug!(
        "Created S3 client for bucket '{}' in {}",
        settings.bucket,
        settings.region
    );
    S3Client::from_conf(builder.build())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_public_object(
        &self,
        key: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), ObjectStoreError> {
        self.client()
            .await
            .put_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| ObjectStoreError::UploadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!("Uploaded '{}' to bucket '{}'", key, self.settings.bucket);
        Ok(())
    }
}
