//! InMemoryImageCatalog - テスト用の偽プロバイダ
//!
//! # 実装詳細
//! - タグ値ごとのイメージと、存在するスナップショットの集合を保持
//! - すべての呼び出しを順番に記録（カスケード順序・中断の検証用）
//! - 任意のイメージ / スナップショット / 一覧取得に失敗を注入できる
//! - page_size を指定すると describe_images がページングする

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    IDENTIFIER_TAG_KEY, ImageDescriptor, ImageId, ProviderError, ProviderOperation, SnapshotId,
    TagFilter,
};
use crate::ports::{ImageCatalog, ImagePage};

/// A provider call as seen by the fake, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    DescribeImages {
        tag_value: String,
        next_token: Option<String>,
    },
    DeregisterImage(ImageId),
    DeleteSnapshot(SnapshotId),
}

struct TaggedImage {
    tag_key: String,
    tag_value: String,
    image: ImageDescriptor,
}

#[derive(Default)]
struct CatalogState {
    images: Vec<TaggedImage>,
    snapshots: HashSet<SnapshotId>,
    calls: Vec<CatalogCall>,
    describe_failure: Option<String>,
    failing_images: HashSet<ImageId>,
    failing_snapshots: HashSet<SnapshotId>,
}

/// In-memory image catalog.
///
/// # 使用例
/// ```ignore
/// let catalog = InMemoryImageCatalog::new();
/// catalog.insert("web", ImageDescriptor::new("ami-1", "2020-01-01T00:00:00.000Z")).await;
/// catalog.fail_deregister("ami-1").await;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryImageCatalog {
    state: Arc<Mutex<CatalogState>>,
    page_size: Option<usize>,
}

impl InMemoryImageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return at most `page_size` images per describe call.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Register an image tagged with `identifier`, along with its snapshots.
    pub async fn insert(&self, identifier: &str, image: ImageDescriptor) {
        self.insert_tagged(IDENTIFIER_TAG_KEY, identifier, image).await;
    }

    pub async fn insert_tagged(&self, tag_key: &str, tag_value: &str, image: ImageDescriptor) {
        let mut state = self.state.lock().await;
        state.snapshots.extend(image.dependent_snapshots().cloned());
        state.images.push(TaggedImage {
            tag_key: tag_key.to_string(),
            tag_value: tag_value.to_string(),
            image,
        });
    }

    pub async fn fail_describe(&self, message: impl Into<String>) {
        self.state.lock().await.describe_failure = Some(message.into());
    }

    pub async fn fail_deregister(&self, image: impl Into<ImageId>) {
        self.state.lock().await.failing_images.insert(image.into());
    }

    pub async fn fail_delete_snapshot(&self, snapshot: impl Into<SnapshotId>) {
        self.state
            .lock()
            .await
            .failing_snapshots
            .insert(snapshot.into());
    }

    /// Every call received so far, oldest first.
    pub async fn calls(&self) -> Vec<CatalogCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Calls other than listing.
    pub async fn delete_calls(&self) -> Vec<CatalogCall> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| !matches!(c, CatalogCall::DescribeImages { .. }))
            .collect()
    }

    /// Image ids still registered under `identifier`, in insertion order.
    pub async fn image_ids(&self, identifier: &str) -> Vec<ImageId> {
        let state = self.state.lock().await;
        state
            .images
            .iter()
            .filter(|t| t.tag_key == IDENTIFIER_TAG_KEY && t.tag_value == identifier)
            .map(|t| t.image.id.clone())
            .collect()
    }

    pub async fn has_snapshot(&self, snapshot: &SnapshotId) -> bool {
        self.state.lock().await.snapshots.contains(snapshot)
    }
}

#[async_trait]
impl ImageCatalog for InMemoryImageCatalog {
    async fn describe_images(
        &self,
        filter: &TagFilter,
        next_token: Option<&str>,
    ) -> Result<ImagePage, ProviderError> {
        let mut state = self.state.lock().await;
        state.calls.push(CatalogCall::DescribeImages {
            tag_value: filter.value.clone(),
            next_token: next_token.map(str::to_string),
        });

        if let Some(message) = &state.describe_failure {
            return Err(ProviderError::new(ProviderOperation::DescribeImages, message.clone()));
        }

        let offset = match next_token {
            Some(token) => token.parse::<usize>().map_err(|_| {
                ProviderError::new(ProviderOperation::DescribeImages, "invalid pagination token")
                    .with_code("InvalidParameterValue")
            })?,
            None => 0,
        };

        let matching: Vec<ImageDescriptor> = state
            .images
            .iter()
            .filter(|t| filter.matches(&t.tag_key, &t.tag_value))
            .map(|t| t.image.clone())
            .collect();

        let end = match self.page_size {
            Some(size) => (offset + size).min(matching.len()),
            None => matching.len(),
        };
        let images = matching
            .get(offset..end)
            .map(<[ImageDescriptor]>::to_vec)
            .unwrap_or_default();
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(ImagePage { images, next_token })
    }

    async fn deregister_image(&self, image: &ImageId) -> Result<(), ProviderError> {
        let mut state = self.state.lock().await;
        state.calls.push(CatalogCall::DeregisterImage(image.clone()));

        if state.failing_images.contains(image) {
            return Err(ProviderError::new(
                ProviderOperation::DeregisterImage,
                format!("injected failure for {image}"),
            ));
        }

        let before = state.images.len();
        state.images.retain(|t| &t.image.id != image);
        if state.images.len() == before {
            return Err(ProviderError::new(
                ProviderOperation::DeregisterImage,
                format!("The image id '[{image}]' does not exist"),
            )
            .with_code("InvalidAMIID.NotFound"));
        }
        Ok(())
    }

    async fn delete_snapshot(&self, snapshot: &SnapshotId) -> Result<(), ProviderError> {
        let mut state = self.state.lock().await;
        state.calls.push(CatalogCall::DeleteSnapshot(snapshot.clone()));

        if state.failing_snapshots.contains(snapshot) {
            return Err(ProviderError::new(
                ProviderOperation::DeleteSnapshot,
                format!("injected failure for {snapshot}"),
            ));
        }

        if !state.snapshots.remove(snapshot) {
            return Err(ProviderError::new(
                ProviderOperation::DeleteSnapshot,
                format!("The snapshot '{snapshot}' does not exist."),
            )
            .with_code("InvalidSnapshot.NotFound"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str, day: u32) -> ImageDescriptor {
        ImageDescriptor::new(id, format!("2020-01-{day:02}T00:00:00.000Z"))
    }

    #[tokio::test]
    async fn describe_filters_by_exact_tag_value() {
        let catalog = InMemoryImageCatalog::new();
        catalog.insert("web", image("ami-1", 1)).await;
        catalog.insert("web-canary", image("ami-2", 2)).await;
        catalog
            .insert_tagged("Name", "web", image("ami-3", 3))
            .await;

        let page = catalog
            .describe_images(&TagFilter::for_identifier("web"), None)
            .await
            .unwrap();

        assert_eq!(page.images.len(), 1);
        assert_eq!(page.images[0].id.as_str(), "ami-1");
        assert_eq!(page.next_token, None);
    }

    #[tokio::test]
    async fn describe_paginates() {
        let catalog = InMemoryImageCatalog::new().with_page_size(2);
        for day in 1..=5 {
            catalog.insert("web", image(&format!("ami-{day}"), day)).await;
        }
        let filter = TagFilter::for_identifier("web");

        let first = catalog.describe_images(&filter, None).await.unwrap();
        assert_eq!(first.images.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("2"));

        let last = catalog.describe_images(&filter, Some("4")).await.unwrap();
        assert_eq!(last.images.len(), 1);
        assert_eq!(last.next_token, None);
    }

    #[tokio::test]
    async fn deregister_unknown_image_is_not_found() {
        let catalog = InMemoryImageCatalog::new();
        let err = catalog
            .deregister_image(&ImageId::new("ami-missing"))
            .await
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("InvalidAMIID.NotFound"));
    }

    #[tokio::test]
    async fn deregister_keeps_snapshots() {
        let catalog = InMemoryImageCatalog::new();
        catalog
            .insert("web", image("ami-1", 1).with_snapshot("snap-1"))
            .await;

        catalog.deregister_image(&ImageId::new("ami-1")).await.unwrap();

        assert!(catalog.image_ids("web").await.is_empty());
        assert!(catalog.has_snapshot(&SnapshotId::new("snap-1")).await);
    }

    #[tokio::test]
    async fn injected_failures_are_recorded() {
        let catalog = InMemoryImageCatalog::new();
        catalog
            .insert("web", image("ami-1", 1).with_snapshot("snap-1"))
            .await;
        catalog.fail_delete_snapshot("snap-1").await;

        let err = catalog
            .delete_snapshot(&SnapshotId::new("snap-1"))
            .await
            .unwrap_err();

        assert_eq!(err.operation, ProviderOperation::DeleteSnapshot);
        assert_eq!(
            catalog.calls().await,
            vec![CatalogCall::DeleteSnapshot(SnapshotId::new("snap-1"))]
        );
        assert!(catalog.has_snapshot(&SnapshotId::new("snap-1")).await);
    }
}
