//! ImageCatalog port - プロバイダのイメージ API
//!
//! 使う操作は 3 つだけです。
//! - describe_images: タグで絞り込んだ一覧（ページング付き）
//! - deregister_image: イメージの登録解除
//! - delete_snapshot: スナップショットの削除

use async_trait::async_trait;

use crate::domain::{ImageDescriptor, ImageId, ProviderError, SnapshotId, TagFilter};

/// One page of a filtered listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePage {
    pub images: Vec<ImageDescriptor>,
    /// Token for the next page; `None` on the last page.
    pub next_token: Option<String>,
}

/// ImageCatalog は認証済みのプロバイダクライアント
///
/// # 設計原則
/// - リトライ・バックオフ・タイムアウトは実装側（クライアント）の責務
/// - このクレートは各呼び出しを 1 回だけ行い、エラーはそのまま上に返す
/// - `Send + Sync` を要求（`Arc<dyn ImageCatalog>` で共有する）
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    /// Fetch one page of images whose tag matches `filter` exactly.
    async fn describe_images(
        &self,
        filter: &TagFilter,
        next_token: Option<&str>,
    ) -> Result<ImagePage, ProviderError>;

    async fn deregister_image(&self, image: &ImageId) -> Result<(), ProviderError>;

    async fn delete_snapshot(&self, snapshot: &SnapshotId) -> Result<(), ProviderError>;
}
