//! RetentionReport - 1 回の実行結果のまとめ

use serde::Serialize;

use super::ids::{ImageId, SnapshotId};
use super::plan::RetentionPlan;

/// What a run kept and removed.
///
/// On a dry run `deleted` and `deleted_snapshots` list what *would* be removed
/// and no provider delete call has been issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetentionReport {
    pub retained: Vec<ImageId>,
    pub deleted: Vec<ImageId>,
    pub deleted_snapshots: Vec<SnapshotId>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

impl RetentionReport {
    /// Empty report that already knows the retained half of `plan`.
    pub fn for_plan(plan: &RetentionPlan) -> Self {
        Self {
            retained: plan.retained.iter().map(|i| i.id.clone()).collect(),
            ..Self::default()
        }
    }

    /// Report of a dry run: every doomed image and snapshot, nothing touched.
    pub fn preview(plan: &RetentionPlan) -> Self {
        let mut report = Self::for_plan(plan);
        for image in &plan.doomed {
            report.deleted.push(image.id.clone());
            report
                .deleted_snapshots
                .extend(image.dependent_snapshots().cloned());
        }
        report.dry_run = true;
        report
    }
}
