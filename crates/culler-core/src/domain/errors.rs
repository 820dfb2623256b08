//! Errors - エラー型と分類
//!
//! プロバイダ呼び出しのエラーはすべて実行を止めます（リトライはクライアント側の責務）。
//! `ProviderError` はプロバイダから返ったものをそのまま保持し、
//! `CullerError` はどの操作で失敗したかだけを付け加えます。

use std::fmt;

use super::ids::{ImageId, SnapshotId};

/// Provider API operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOperation {
    Connect,
    DescribeImages,
    DeregisterImage,
    DeleteSnapshot,
}

impl fmt::Display for ProviderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "Connect",
            Self::DescribeImages => "DescribeImages",
            Self::DeregisterImage => "DeregisterImage",
            Self::DeleteSnapshot => "DeleteSnapshot",
        };
        f.write_str(name)
    }
}

/// Error returned by the provider client, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation}: {message}")]
pub struct ProviderError {
    pub operation: ProviderOperation,
    /// Provider error code, when the provider sent one (e.g. `InvalidAMIID.NotFound`).
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(operation: ProviderOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// ErrorKind は実行エラーの分類
///
/// - Connect: クライアント構築の失敗（何も削除していない）
/// - Query: 一覧取得の失敗（何も削除していない）
/// - ImageDeletion: イメージの deregister 失敗（それ以降は未処理）
/// - SnapshotDeletion: deregister 後の snapshot 削除失敗（孤立 snapshot が残る）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connect,
    Query,
    ImageDeletion,
    SnapshotDeletion,
}

#[derive(Debug, thiserror::Error)]
pub enum CullerError {
    #[error("failed to create image catalog client: {0}")]
    Connect(#[source] ProviderError),

    #[error("failed to list images: {0}")]
    Query(#[source] ProviderError),

    #[error("failed to deregister image {image}: {source}")]
    DeregisterImage {
        image: ImageId,
        #[source]
        source: ProviderError,
    },

    /// The owning image is already deregistered when this happens.
    #[error("failed to delete snapshot {snapshot} of image {image}: {source}")]
    DeleteSnapshot {
        image: ImageId,
        snapshot: SnapshotId,
        #[source]
        source: ProviderError,
    },
}

impl CullerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connect(_) => ErrorKind::Connect,
            Self::Query(_) => ErrorKind::Query,
            Self::DeregisterImage { .. } => ErrorKind::ImageDeletion,
            Self::DeleteSnapshot { .. } => ErrorKind::SnapshotDeletion,
        }
    }
}
