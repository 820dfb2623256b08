//! ImageLister - タグで絞り込んだイメージ一覧の取得
//!
//! プロバイダがページングしている場合でも、最後のページまで取り切ってから返します。
//! 途中で切ると keep_count の意味が壊れるためです。
//!
//! 一度返ったページトークンがもう一度返ってきたら、そこで Query エラーにします。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{CullerError, ImageDescriptor, ProviderError, ProviderOperation, TagFilter};
use crate::ports::ImageCatalog;

pub struct ImageLister {
    catalog: Arc<dyn ImageCatalog>,
}

impl ImageLister {
    pub fn new(catalog: Arc<dyn ImageCatalog>) -> Self {
        Self { catalog }
    }

    /// List every image matching `filter`, in provider order.
    ///
    /// Any provider error aborts the listing with `CullerError::Query`.
    pub async fn list_images(&self, filter: &TagFilter) -> Result<Vec<ImageDescriptor>, CullerError> {
        debug!(
            filter = %filter.filter_name(),
            value = %filter.value,
            "Describing images for generation management"
        );

        let mut images = Vec::new();
        let mut seen_tokens = HashSet::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;
        loop {
            let page = self
                .catalog
                .describe_images(filter, next_token.as_deref())
                .await
                .map_err(CullerError::Query)?;
            pages += 1;
            debug!(page = pages, count = page.images.len(), "fetched image page");
            images.extend(page.images);

            let token = match page.next_token {
                Some(token) if !token.is_empty() => token,
                _ => break,
            };
            if !seen_tokens.insert(token.clone()) {
                warn!(token = %token, pages, "provider repeated a pagination token");
                return Err(CullerError::Query(ProviderError::new(
                    ProviderOperation::DescribeImages,
                    format!("pagination token repeated: {token}"),
                )));
            }
            next_token = Some(token);
        }

        debug!(total = images.len(), pages, "listing complete");
        Ok(images)
    }
}
