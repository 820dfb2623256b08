//! Config - 設定ファイル
//!
//! TOML ファイルから読み込みます。どの項目も CLI 側で上書きできます。
//!
//! # 例
//!
//! ```toml
//! identifier = "web-server"
//! keep_releases = 3
//! region = "us-east-1"
//! # access_key = "AKIA..."
//! # secret_key = "..."
//! # max_retries = 11
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::RetentionPolicy;
use crate::ports::ProviderSettings;
use crate::ports::catalog_factory::DEFAULT_MAX_RETRIES;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CullerConfig {
    /// Value of the identifier tag that groups the images to prune.
    pub identifier: String,

    /// Number of newest images to keep. Negative values keep nothing.
    pub keep_releases: i64,

    #[serde(default)]
    pub region: Option<String>,

    /// Static credentials; when absent the provider's default chain is used.
    #[serde(default)]
    pub access_key: Option<String>,

    #[serde(default)]
    pub secret_key: Option<String>,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Custom endpoint (e.g. a local emulator).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl CullerConfig {
    pub fn new(identifier: impl Into<String>, keep_releases: i64) -> Self {
        Self {
            identifier: identifier.into(),
            keep_releases,
            region: None,
            access_key: None,
            secret_key: None,
            max_retries: DEFAULT_MAX_RETRIES,
            endpoint_url: None,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|source| ConfigError::Io {
                source,
                path: path.as_ref().to_path_buf(),
            })?;

        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: CullerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(ConfigError::Validation(
                "access_key and secret_key must be set together".into(),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.identifier.clone(), self.keep_releases)
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            region: self.region.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            max_retries: self.max_retries,
            endpoint_url: self.endpoint_url.clone(),
        }
    }
}
