//! Value Object 定義
//!
//! 不変で、値によって同一性が決まるドメインの型を定義します。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// 接続 ID
///
/// 接続ごとに呼び出し側（フロントドア）が払い出す一意な文字列。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// 新しい ConnectionId を作成（空文字は不可）
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::ConnectionIdEmpty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// コンパクトタイムスタンプ（`YYYYMMDDhhmmssSSS` を整数として読んだ値）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// メッセージ ID
///
/// 追記時点のメッセージ件数から導出される。ローテーション時は元の ID を保持する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 参加者の表示色（6 桁の 16 進数文字列）
///
/// 送信者が見つからない場合は空文字になり得るため、保存済みの値は検証しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color(String);

impl Color {
    /// 接続時刻から色を導出する
    ///
    /// タイムスタンプを 16 進数に変換し、末尾 4 文字の前に `"00"` を付ける。
    /// 同じタイムスタンプからは常に同じ色が得られる。
    pub fn derive(created_at: Timestamp) -> Self {
        let hex = format!("{:04x}", created_at.value());
        let tail = &hex[hex.len() - 4..];
        Self(format!("00{tail}"))
    }

    /// 保存済みの値から復元する
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// 送信者不明時の空の色
    pub fn unknown() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
