//! Provider-assigned identifiers (strongly-typed IDs).
//!
//! Image と Snapshot の ID はどちらもプロバイダが払い出す不透明な文字列です
//! （例: `ami-0abc...`, `snap-0def...`）。こちらで生成することはありません。
//!
//! ## Phantom Type パターン
//! `Id<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わない（PhantomData）マーカー型として、
//! コンパイル時に ImageId と SnapshotId の取り違えを防ぎます。

use serde::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// IdMarker は各 ID 型のマーカー trait
///
/// ログやエラーメッセージで使う種別名（"image", "snapshot"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn kind() -> &'static str;
}

/// ジェネリック ID 型
///
/// # 例
/// ```ignore
/// let image = ImageId::new("ami-1");
/// let snapshot = SnapshotId::new("snap-1");
/// // image と snapshot は異なる型なので、混同できない
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// 種別名（"image" / "snapshot"）
    pub fn kind(&self) -> &'static str {
        T::kind()
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// Report の JSON では素の文字列として出す
impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Image のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Image {}

impl IdMarker for Image {
    fn kind() -> &'static str {
        "image"
    }
}

/// Snapshot のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Snapshot {}

impl IdMarker for Snapshot {
    fn kind() -> &'static str {
        "snapshot"
    }
}

/// Identifier of a machine image (the unit that gets deregistered).
pub type ImageId = Id<Image>;

/// Identifier of a storage snapshot backing one of an image's devices.
pub type SnapshotId = Id<Snapshot>;
