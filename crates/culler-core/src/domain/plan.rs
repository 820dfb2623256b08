//! RetentionPlan - 保持 / 削除への分割
//!
//! 一覧と keep_count だけから決まる純粋な計算です。
//! 実際の削除は `app::RetentionManager` が行います。

use tracing::warn;

use super::image::ImageDescriptor;

/// Images split at the keep boundary, both halves newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// The `keep_count` most recent images (or all of them, if fewer).
    pub retained: Vec<ImageDescriptor>,

    /// Everything past the boundary, from the (keep_count+1)-th newest to the oldest.
    pub doomed: Vec<ImageDescriptor>,
}

impl RetentionPlan {
    /// Sort `images` newest first and split after `keep_count`.
    ///
    /// `keep_count >= images.len()` yields an empty deletion set.
    pub fn build(mut images: Vec<ImageDescriptor>, keep_count: usize) -> Self {
        sort_newest_first(&mut images);
        let boundary = keep_count.min(images.len());
        let doomed = images.split_off(boundary);
        Self {
            retained: images,
            doomed,
        }
    }
}

/// Sort by creation date, most recent first.
///
/// The sort is stable, so images with equal dates keep their listing order.
/// Malformed dates order as the earliest instant and end up last.
pub fn sort_newest_first(images: &mut [ImageDescriptor]) {
    for image in images.iter().filter(|i| i.created_at.is_malformed()) {
        warn!(
            image = %image.id,
            created_at = %image.created_at,
            "unparsable creation date; ordering image as oldest"
        );
    }
    images.sort_by(|a, b| a.created_at.newest_first(&b.created_at));
}
