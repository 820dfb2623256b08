//! PostProcessorBuilder - PostProcessor の構築とワイヤリング
//!
//! # 使用例
//! ```ignore
//! let processor = PostProcessorBuilder::from_config(&config)
//!     .factory(Arc::new(Ec2CatalogFactory))
//!     .progress(Arc::new(StdoutProgress))
//!     .build()?;
//! ```
//!
//! # Fail-fast 設計
//! - factory が未設定なら build() で BuildError
//! - access_key / secret_key の片方だけ設定されていたら BuildError

use std::sync::Arc;

use super::post_processor::PostProcessor;
use super::status::RunStatus;
use crate::config::CullerConfig;
use crate::domain::RetentionPolicy;
use crate::impls::TracingProgress;
use crate::ports::{CatalogFactory, ProgressSink, ProviderSettings};

/// BuildError は PostProcessor 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No catalog factory configured. Call `factory()` before `build()`.")]
    MissingCatalogFactory,

    #[error("access_key and secret_key must be set together")]
    PartialCredentials,
}

pub struct PostProcessorBuilder {
    policy: RetentionPolicy,
    settings: ProviderSettings,
    factory: Option<Arc<dyn CatalogFactory>>,
    progress: Option<Arc<dyn ProgressSink>>,
    dry_run: bool,
}

impl PostProcessorBuilder {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            settings: ProviderSettings::default(),
            factory: None,
            progress: None,
            dry_run: false,
        }
    }

    /// Policy and provider settings taken from a resolved config.
    pub fn from_config(config: &CullerConfig) -> Self {
        Self::new(config.policy()).settings(config.provider_settings())
    }

    pub fn settings(mut self, settings: ProviderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn factory(mut self, factory: Arc<dyn CatalogFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Where "Deleting image: ..." messages go. Defaults to the log.
    pub fn progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// List and plan only; issue no delete calls.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Result<PostProcessor, BuildError> {
        let factory = self.factory.ok_or(BuildError::MissingCatalogFactory)?;
        if self.settings.access_key.is_some() != self.settings.secret_key.is_some() {
            return Err(BuildError::PartialCredentials);
        }
        let progress = self
            .progress
            .unwrap_or_else(|| Arc::new(TracingProgress));

        Ok(PostProcessor {
            policy: self.policy,
            settings: self.settings,
            factory,
            progress,
            dry_run: self.dry_run,
            status: RunStatus::new(),
        })
    }
}
