//! CatalogFactory port - 認証済みクライアントの生成
//!
//! 認証情報のチェーン解決はファクトリ実装の中に閉じ込めます。
//! PostProcessor はファクトリを注入されるだけで、クライアントを直接組み立てません。

use std::sync::Arc;

use async_trait::async_trait;

use super::catalog::ImageCatalog;
use crate::domain::ProviderError;

/// Connection settings handed to a factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Retries on transient errors, owned by the client.
    pub max_retries: u32,
    pub endpoint_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            region: None,
            access_key: None,
            secret_key: None,
            max_retries: DEFAULT_MAX_RETRIES,
            endpoint_url: None,
        }
    }
}

pub const DEFAULT_MAX_RETRIES: u32 = 11;

#[async_trait]
pub trait CatalogFactory: Send + Sync {
    async fn connect(
        &self,
        settings: &ProviderSettings,
    ) -> Result<Arc<dyn ImageCatalog>, ProviderError>;
}
