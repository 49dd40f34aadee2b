//! ObjectStore trait 定義
//!
//! 画像バイナリの保存先。保存したオブジェクトは誰でも読める状態で公開される。

use async_trait::async_trait;

use super::ObjectStoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// オブジェクトを public-read で保存
    async fn put_public_object(
        &self,
        key: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), ObjectStoreError>;
}

/// 公開 URL を組み立てる
///
/// `https://<bucket>.s3-<region>.amazonaws.com/<key>`
pub fn public_object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3-{region}.amazonaws.com/{key}")
}

/// バケットの公開 URL の接頭辞（画像メッセージの判定に使う）
pub fn public_bucket_prefix(bucket: &str) -> String {
    format!("https://{bucket}")
}
