//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! クラウドプロバイダ（EC2 など）への依存はすべてここの trait 越しに行い、
//! テストでは `impls` の InMemory 実装に差し替えます。

pub mod catalog;
pub mod catalog_factory;
pub mod progress;

// 主要な trait を再エクスポート
pub use self::catalog::{ImageCatalog, ImagePage};
pub use self::catalog_factory::{CatalogFactory, ProviderSettings};
pub use self::progress::ProgressSink;
