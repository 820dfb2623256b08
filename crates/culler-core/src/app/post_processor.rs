//! PostProcessor - ビルド後処理としての保持ポリシー実行
//!
//! 1 回の実行で 1 つの identifier を最初から最後まで順番に処理します。
//! 受け取った artifact には触らず、成功しても失敗してもそのまま呼び出し元に返します。

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use super::builder::PostProcessorBuilder;
use super::lister::ImageLister;
use super::retention::RetentionManager;
use super::status::{RunState, RunStatus};
use crate::domain::{CullerError, RetentionPlan, RetentionPolicy, RetentionReport};
use crate::ports::{CatalogFactory, ProgressSink, ProviderSettings};

/// Result of a successful post-processing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed<A> {
    /// The input artifact, unchanged.
    pub artifact: A,
    /// Whether the caller should keep the artifact. Always `true`.
    pub keep_artifact: bool,
    pub report: RetentionReport,
}

/// Result of a failed post-processing step.
///
/// The artifact is still handed back and still marked to be kept; whether
/// the surrounding build fails is up to the caller.
#[derive(Debug)]
pub struct ProcessFailure<A> {
    pub artifact: A,
    /// Always `true`.
    pub keep_artifact: bool,
    pub error: CullerError,
}

impl<A> fmt::Display for ProcessFailure<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<A: fmt::Debug> std::error::Error for ProcessFailure<A> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub struct PostProcessor {
    pub(super) policy: RetentionPolicy,
    pub(super) settings: ProviderSettings,
    pub(super) factory: Arc<dyn CatalogFactory>,
    pub(super) progress: Arc<dyn ProgressSink>,
    pub(super) dry_run: bool,
    pub(super) status: RunStatus,
}

impl PostProcessor {
    pub fn builder(policy: RetentionPolicy) -> PostProcessorBuilder {
        PostProcessorBuilder::new(policy)
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    /// Apply the retention policy, then hand `artifact` back untouched.
    ///
    /// On failure the artifact comes back inside `ProcessFailure` together
    /// with the error.
    pub async fn post_process<A>(&self, artifact: A) -> Result<Processed<A>, ProcessFailure<A>> {
        info!(
            identifier = %self.policy.identifier,
            keep = self.policy.keep_count,
            dry_run = self.dry_run,
            "Running image retention post-processor"
        );
        self.status.advance(RunState::Idle);

        match self.run().await {
            Ok(report) => {
                info!(
                    retained = report.retained.len(),
                    deleted = report.deleted.len(),
                    snapshots = report.deleted_snapshots.len(),
                    "image retention finished"
                );
                Ok(Processed {
                    artifact,
                    keep_artifact: true,
                    report,
                })
            }
            Err(err) => {
                self.status.advance(RunState::Failed);
                error!(error = %err, kind = ?err.kind(), "image retention failed");
                Err(ProcessFailure {
                    artifact,
                    keep_artifact: true,
                    error: err,
                })
            }
        }
    }

    async fn run(&self) -> Result<RetentionReport, CullerError> {
        debug!(region = ?self.settings.region, "Creating image catalog client");
        let catalog = self
            .factory
            .connect(&self.settings)
            .await
            .map_err(CullerError::Connect)?;

        self.status.advance(RunState::Listing);
        let images = ImageLister::new(Arc::clone(&catalog))
            .list_images(&self.policy.tag_filter())
            .await?;

        if self.dry_run {
            self.status.advance(RunState::Sorting);
            let plan = RetentionPlan::build(images, self.policy.keep_count);
            for image in &plan.doomed {
                self.progress
                    .message(&format!("Would delete image: {}", image.id));
            }
            self.status.advance(RunState::Done);
            return Ok(RetentionReport::preview(&plan));
        }

        RetentionManager::new(catalog, Arc::clone(&self.progress))
            .with_status(self.status.clone())
            .apply(images, self.policy.keep_count)
            .await
    }
}
