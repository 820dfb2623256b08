//! StaticCatalogFactory - 既に組み立て済みのクライアントを返す
//!
//! テストでは InMemoryImageCatalog を包んで PostProcessor に注入します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ProviderError;
use crate::ports::{CatalogFactory, ImageCatalog, ProviderSettings};

pub struct StaticCatalogFactory {
    catalog: Arc<dyn ImageCatalog>,
    seen: Mutex<Vec<ProviderSettings>>,
}

impl StaticCatalogFactory {
    pub fn new(catalog: Arc<dyn ImageCatalog>) -> Self {
        Self {
            catalog,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Settings passed to every `connect` call so far.
    pub async fn connections(&self) -> Vec<ProviderSettings> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl CatalogFactory for StaticCatalogFactory {
    async fn connect(
        &self,
        settings: &ProviderSettings,
    ) -> Result<Arc<dyn ImageCatalog>, ProviderError> {
        self.seen.lock().await.push(settings.clone());
        Ok(Arc::clone(&self.catalog))
    }
}
