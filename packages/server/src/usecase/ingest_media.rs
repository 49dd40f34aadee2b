//! UseCase: 画像の取り込み
//!
//! data URI の base64 部分をデコードし、ファイル名に時刻を埋め込んだキーで
//! 公開状態のままオブジェクトストアに保存して、その公開 URL を返します。

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use irori_shared::time::Clock;

use crate::domain::{ObjectStore, object_store::public_object_url};

use super::error::{MediaError, ValidationError};

/// 受け付ける拡張子と Content-Type（大文字小文字を区別する）
const IMAGE_TYPES: [(&str, &str); 4] = [
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".png", "image/png"),
];

/// 画像取り込みのユースケース
pub struct IngestMediaUseCase {
    object_store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    bucket: String,
    region: String,
}

impl IngestMediaUseCase {
    /// 新しい IngestMediaUseCase を作成
    ///
    /// # Arguments
    ///
    /// * `object_store` - 保存先
    /// * `clock` - キーに埋め込む時刻の取得元
    /// * `bucket` / `region` - 公開 URL の組み立てに使う
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        bucket: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            object_store,
            clock,
            bucket: bucket.into(),
            region: region.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// 画像を保存し、公開 URL を返す
    ///
    /// # Arguments
    ///
    /// * `filename` - 元のファイル名（拡張子で Content-Type を決める）
    /// * `data_uri` - `data:image/png;base64,....` 形式の文字列
    pub async fn execute(&self, filename: &str, data_uri: &str) -> Result<String, MediaError> {
        let body = decode_payload(data_uri)?;
        let (stem, extension) = split_extension(filename);
        let content_type = content_type_for(extension)?;

        let key = format!("{}{}{}", stem, self.clock.now_compact(), extension);
        self.object_store
            .put_public_object(&key, content_type, body)
            .await?;

        Ok(public_object_url(&self.bucket, &self.region, &key))
    }
}

/// data URI の最初の `,` 以降を base64 としてデコードする
///
/// `,` がなければ全体をデコードする。折り返しの `\r` `\n` は読み飛ばす。
fn decode_payload(data_uri: &str) -> Result<Vec<u8>, ValidationError> {
    let payload = data_uri
        .split_once(',')
        .map_or(data_uri, |(_, payload)| payload);
    let payload: String = payload
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect();
    B64.decode(payload)
        .map_err(|e| ValidationError::UndecodablePayload(e.to_string()))
}

/// ファイル名を (拡張子を除いた部分, `.` を含む拡張子) に分ける
///
/// 拡張子は最後のパス要素の最後の `.` から。なければ空文字列。
fn split_extension(filename: &str) -> (&str, &str) {
    let segment_start = filename.rfind('/').map_or(0, |i| i + 1);
    match filename[segment_start..].rfind('.') {
        Some(dot) => filename.split_at(segment_start + dot),
        None => (filename, ""),
    }
}

fn content_type_for(extension: &str) -> Result<&'static str, ValidationError> {
    IMAGE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
        .ok_or_else(|| ValidationError::InvalidExtension(extension.to_string()))
}
