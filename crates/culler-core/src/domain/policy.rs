//! RetentionPolicy - 保持ポリシーと対象イメージを選ぶタグフィルタ

use tracing::warn;

/// Tag key whose value groups the images of one retention policy.
pub const IDENTIFIER_TAG_KEY: &str = "Amazon_AMI_Management_Identifier";

/// Exact-match tag filter sent with every listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn for_identifier(identifier: impl Into<String>) -> Self {
        Self {
            key: IDENTIFIER_TAG_KEY.to_string(),
            value: identifier.into(),
        }
    }

    /// Filter name in the provider's `tag:<key>` syntax.
    pub fn filter_name(&self) -> String {
        format!("tag:{}", self.key)
    }

    pub fn matches(&self, key: &str, value: &str) -> bool {
        self.key == key && self.value == value
    }
}

/// Which image group to prune and how many of the newest to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub identifier: String,
    pub keep_count: usize,
}

impl RetentionPolicy {
    /// Build a policy from a configured keep count.
    ///
    /// A negative `keep_releases` is clamped to zero, i.e. every image in the
    /// group is deleted. An empty identifier is kept as-is: it is sent as an
    /// exact-match filter and selects nothing.
    pub fn new(identifier: impl Into<String>, keep_releases: i64) -> Self {
        let identifier = identifier.into();
        if identifier.is_empty() {
            warn!("retention identifier is empty; no images will match");
        }
        let keep_count = if keep_releases < 0 {
            warn!(keep_releases, "negative keep count treated as 0");
            0
        } else {
            usize::try_from(keep_releases).unwrap_or(usize::MAX)
        };
        Self {
            identifier,
            keep_count,
        }
    }

    pub fn tag_filter(&self) -> TagFilter {
        TagFilter::for_identifier(self.identifier.clone())
    }
}
