//! App - アプリケーション層
//!
//! ports を組み合わせて保持ポリシーを実行します。
//!
//! # 主要コンポーネント
//! - **ImageLister**: タグで絞り込んだ全イメージの取得（全ページ）
//! - **RetentionManager**: 並べ替え・分割・削除（スナップショットまで）
//! - **PostProcessor**: ビルド後処理としての 1 回分の実行。artifact はそのまま返す
//! - **PostProcessorBuilder**: 構築とワイヤリング（Fail-fast）
//! - **RunStatus**: 実行状態（Idle → Listing → Sorting → Deleting → Done | Failed）

pub mod builder;
pub mod lister;
pub mod retention;
pub mod post_processor;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, PostProcessorBuilder};
pub use self::lister::ImageLister;
pub use self::retention::RetentionManager;
pub use self::post_processor::{PostProcessor, ProcessFailure, Processed};
pub use self::status::{RunState, RunStatus};
