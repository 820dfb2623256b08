//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryImageCatalog**: 呼び出しを記録する偽プロバイダ
//! - **StaticCatalogFactory**: 既存のクライアントを返すだけのファクトリ
//! - **TracingProgress / RecordingProgress**: ProgressSink
//!
//! 本番用の EC2 実装は `culler-cli` にあります。

pub mod inmem_catalog;
pub mod static_factory;
pub mod progress;

pub use self::inmem_catalog::{CatalogCall, InMemoryImageCatalog};
pub use self::static_factory::StaticCatalogFactory;
pub use self::progress::{RecordingProgress, TracingProgress};
