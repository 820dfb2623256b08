//! RetentionManager - 古いイメージとそのスナップショットの削除
//!
//! # フロー
//! 1. 作成日時の降順に並べ替え（RetentionPlan::build）
//! 2. keep_count 件目で分割し、それ以降を削除対象にする
//! 3. 削除対象を新しい順に 1 件ずつ:
//!    a. 進捗メッセージを出す
//!    b. イメージを deregister（失敗したら即中断）
//!    c. deregister 成功後、スナップショットを順に削除（失敗したら即中断）
//!
//! スナップショット削除で失敗した場合、イメージはすでに消えているので
//! スナップショットが孤立したまま残ります。ロールバックはしません。

use std::sync::Arc;

use tracing::debug;

use super::status::{RunState, RunStatus};
use crate::domain::{CullerError, ImageDescriptor, RetentionPlan, RetentionReport};
use crate::ports::{ImageCatalog, ProgressSink};

pub struct RetentionManager {
    catalog: Arc<dyn ImageCatalog>,
    progress: Arc<dyn ProgressSink>,
    status: RunStatus,
}

impl RetentionManager {
    pub fn new(catalog: Arc<dyn ImageCatalog>, progress: Arc<dyn ProgressSink>) -> Self {
        Self {
            catalog,
            progress,
            status: RunStatus::new(),
        }
    }

    /// Report state transitions to a shared status handle.
    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    /// Keep the `keep_count` newest images and delete the rest.
    ///
    /// Stops at the first provider error; images processed before it stay
    /// deleted and images after it are never touched.
    pub async fn apply(
        &self,
        images: Vec<ImageDescriptor>,
        keep_count: usize,
    ) -> Result<RetentionReport, CullerError> {
        self.status.advance(RunState::Sorting);
        let plan = RetentionPlan::build(images, keep_count);
        self.execute(&plan).await
    }

    /// Delete every image of `plan.doomed`, in order.
    pub async fn execute(&self, plan: &RetentionPlan) -> Result<RetentionReport, CullerError> {
        debug!(
            retained = plan.retained.len(),
            doomed = plan.doomed.len(),
            "Deleting old images"
        );

        let mut report = RetentionReport::for_plan(plan);
        let total = plan.doomed.len();
        for (index, image) in plan.doomed.iter().enumerate() {
            self.status.advance(RunState::Deleting { index, total });
            if let Err(err) = self.delete_image(image, &mut report).await {
                self.status.advance(RunState::Failed);
                return Err(err);
            }
        }

        self.status.advance(RunState::Done);
        Ok(report)
    }

    async fn delete_image(
        &self,
        image: &ImageDescriptor,
        report: &mut RetentionReport,
    ) -> Result<(), CullerError> {
        self.progress.message(&format!("Deleting image: {}", image.id));
        debug!(image = %image.id, created_at = %image.created_at, "Deregistering image");
        self.catalog
            .deregister_image(&image.id)
            .await
            .map_err(|source| CullerError::DeregisterImage {
                image: image.id.clone(),
                source,
            })?;
        report.deleted.push(image.id.clone());

        // deregister はイメージだけを消し、スナップショットは残る
        debug!(image = %image.id, "Deleting snapshots related to image");
        for snapshot in image.dependent_snapshots() {
            debug!(image = %image.id, snapshot = %snapshot, "Deleting snapshot");
            self.catalog
                .delete_snapshot(snapshot)
                .await
                .map_err(|source| CullerError::DeleteSnapshot {
                    image: image.id.clone(),
                    snapshot: snapshot.clone(),
                    source,
                })?;
            report.deleted_snapshots.push(snapshot.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BlockDevice, ErrorKind, ImageId, SnapshotId};
    use crate::impls::{CatalogCall, InMemoryImageCatalog, RecordingProgress};

    struct Fixture {
        catalog: InMemoryImageCatalog,
        progress: Arc<RecordingProgress>,
        manager: RetentionManager,
    }

    fn fixture() -> Fixture {
        let catalog = InMemoryImageCatalog::new();
        let progress = Arc::new(RecordingProgress::new());
        let manager = RetentionManager::new(Arc::new(catalog.clone()), progress.clone());
        Fixture {
            catalog,
            progress,
            manager,
        }
    }

    async fn seed(catalog: &InMemoryImageCatalog, images: &[ImageDescriptor]) {
        for image in images {
            catalog.insert("web", image.clone()).await;
        }
    }

    fn deregister(id: &str) -> CatalogCall {
        CatalogCall::DeregisterImage(ImageId::new(id))
    }

    fn delete_snapshot(id: &str) -> CatalogCall {
        CatalogCall::DeleteSnapshot(SnapshotId::new(id))
    }

    fn scenario() -> Vec<ImageDescriptor> {
        vec![
            ImageDescriptor::new("ami-1", "2020-01-03T00:00:00.000Z").with_snapshot("snap-1"),
            ImageDescriptor::new("ami-2", "2020-01-02T00:00:00.000Z").with_snapshot("snap-2"),
            ImageDescriptor::new("ami-3", "2020-01-01T00:00:00.000Z"),
        ]
    }

    #[tokio::test]
    async fn deletes_older_images_and_their_snapshots() {
        let f = fixture();
        seed(&f.catalog, &scenario()).await;

        let report = f.manager.apply(scenario(), 1).await.unwrap();

        assert_eq!(
            f.catalog.calls().await,
            vec![deregister("ami-2"), delete_snapshot("snap-2"), deregister("ami-3")]
        );
        assert_eq!(report.retained, vec![ImageId::new("ami-1")]);
        assert_eq!(report.deleted, vec![ImageId::new("ami-2"), ImageId::new("ami-3")]);
        assert_eq!(report.deleted_snapshots, vec![SnapshotId::new("snap-2")]);
        assert_eq!(
            f.progress.messages(),
            vec!["Deleting image: ami-2", "Deleting image: ami-3"]
        );
        assert_eq!(f.catalog.image_ids("web").await, vec![ImageId::new("ami-1")]);
        assert_eq!(f.manager.status().current(), RunState::Done);
    }

    #[tokio::test]
    async fn snapshots_are_deleted_after_their_image() {
        let f = fixture();
        let images = vec![
            ImageDescriptor::new("ami-new", "2020-02-01T00:00:00.000Z"),
            ImageDescriptor::new("ami-old", "2020-01-01T00:00:00.000Z")
                .with_snapshot("snap-a")
                .with_snapshot("snap-b"),
        ];
        seed(&f.catalog, &images).await;

        f.manager.apply(images, 1).await.unwrap();

        assert_eq!(
            f.catalog.calls().await,
            vec![deregister("ami-old"), delete_snapshot("snap-a"), delete_snapshot("snap-b")]
        );
    }

    #[tokio::test]
    async fn failed_deregister_skips_its_snapshots() {
        let f = fixture();
        let images = vec![
            ImageDescriptor::new("ami-new", "2020-02-01T00:00:00.000Z"),
            ImageDescriptor::new("ami-old", "2020-01-01T00:00:00.000Z")
                .with_snapshot("snap-a")
                .with_snapshot("snap-b"),
        ];
        seed(&f.catalog, &images).await;
        f.catalog.fail_deregister("ami-old").await;

        let err = f.manager.apply(images, 1).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ImageDeletion);
        assert_eq!(f.catalog.calls().await, vec![deregister("ami-old")]);
        assert!(f.catalog.has_snapshot(&SnapshotId::new("snap-a")).await);
        assert_eq!(f.manager.status().current(), RunState::Failed);
    }

    #[tokio::test]
    async fn ephemeral_devices_produce_no_snapshot_calls() {
        let f = fixture();
        let images = vec![
            ImageDescriptor::new("ami-new", "2020-02-01T00:00:00.000Z"),
            ImageDescriptor::new("ami-old", "2020-01-01T00:00:00.000Z")
                .with_device(BlockDevice::ephemeral("/dev/sdb"))
                .with_device(BlockDevice::backed_by("/dev/sda1", "snap-root")),
        ];
        seed(&f.catalog, &images).await;

        let report = f.manager.apply(images, 1).await.unwrap();

        assert_eq!(
            f.catalog.calls().await,
            vec![deregister("ami-old"), delete_snapshot("snap-root")]
        );
        assert_eq!(report.deleted_snapshots, vec![SnapshotId::new("snap-root")]);
    }

    #[tokio::test]
    async fn aborts_on_first_failed_deregister() {
        let f = fixture();
        let images = vec![
            ImageDescriptor::new("ami-keep", "2020-01-04T00:00:00.000Z"),
            ImageDescriptor::new("ami-a", "2020-01-03T00:00:00.000Z").with_snapshot("snap-a"),
            ImageDescriptor::new("ami-b", "2020-01-02T00:00:00.000Z").with_snapshot("snap-b"),
            ImageDescriptor::new("ami-c", "2020-01-01T00:00:00.000Z").with_snapshot("snap-c"),
        ];
        seed(&f.catalog, &images).await;
        f.catalog.fail_deregister("ami-b").await;

        let err = f.manager.apply(images, 1).await.unwrap_err();

        match &err {
            CullerError::DeregisterImage { image, .. } => assert_eq!(image.as_str(), "ami-b"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            f.catalog.calls().await,
            vec![deregister("ami-a"), delete_snapshot("snap-a"), deregister("ami-b")]
        );
        assert_eq!(
            f.catalog.image_ids("web").await,
            vec![ImageId::new("ami-keep"), ImageId::new("ami-b"), ImageId::new("ami-c")]
        );
        assert!(f.catalog.has_snapshot(&SnapshotId::new("snap-c")).await);
    }

    #[tokio::test]
    async fn failed_snapshot_delete_leaves_image_deregistered() {
        let f = fixture();
        let images = vec![
            ImageDescriptor::new("ami-keep", "2020-01-03T00:00:00.000Z"),
            ImageDescriptor::new("ami-a", "2020-01-02T00:00:00.000Z")
                .with_snapshot("snap-a1")
                .with_snapshot("snap-a2"),
            ImageDescriptor::new("ami-b", "2020-01-01T00:00:00.000Z"),
        ];
        seed(&f.catalog, &images).await;
        f.catalog.fail_delete_snapshot("snap-a1").await;

        let err = f.manager.apply(images, 1).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SnapshotDeletion);
        assert_eq!(
            f.catalog.calls().await,
            vec![deregister("ami-a"), delete_snapshot("snap-a1")]
        );
        // イメージは消えたがスナップショットは孤立して残る
        assert!(!f.catalog.image_ids("web").await.contains(&ImageId::new("ami-a")));
        assert!(f.catalog.has_snapshot(&SnapshotId::new("snap-a1")).await);
        assert!(f.catalog.has_snapshot(&SnapshotId::new("snap-a2")).await);
    }

    #[tokio::test]
    async fn keep_count_covering_everything_issues_no_calls() {
        let f = fixture();
        seed(&f.catalog, &scenario()).await;

        let report = f.manager.apply(scenario(), 3).await.unwrap();

        assert!(f.catalog.calls().await.is_empty());
        assert!(report.deleted.is_empty());
        assert_eq!(report.retained.len(), 3);
        assert!(f.progress.messages().is_empty());
    }

    #[tokio::test]
    async fn zero_keep_count_deletes_everything() {
        let f = fixture();
        seed(&f.catalog, &scenario()).await;

        let report = f.manager.apply(scenario(), 0).await.unwrap();

        assert_eq!(
            report.deleted,
            vec![ImageId::new("ami-1"), ImageId::new("ami-2"), ImageId::new("ami-3")]
        );
        assert!(f.catalog.image_ids("web").await.is_empty());
    }

    #[tokio::test]
    async fn progress_is_emitted_before_deregister() {
        let f = fixture();
        let images = scenario();
        seed(&f.catalog, &images).await;
        f.catalog.fail_deregister("ami-2").await;

        f.manager.apply(images, 1).await.unwrap_err();

        assert_eq!(f.progress.messages(), vec!["Deleting image: ami-2"]);
    }
}
