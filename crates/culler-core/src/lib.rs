//! culler-core
//!
//! Core building blocks for generation-based image retention.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, timestamp, image, policy, plan, report, errors）
//! - **ports**: 抽象化レイヤー（ImageCatalog, CatalogFactory, ProgressSink）
//! - **app**: アプリケーションロジック（ImageLister, RetentionManager, PostProcessor, builder, status）
//! - **impls**: 実装（InMemoryImageCatalog などテスト・開発用）
//! - **config**: TOML 設定の読み込みと検証

pub mod domain;
pub mod ports;
pub mod app;
pub mod impls;
pub mod config;
