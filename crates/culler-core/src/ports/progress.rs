//! ProgressSink port - ユーザー向けの進捗メッセージ
//!
//! ログ（tracing）とは別の出口です。呼び出し元のツールが画面に出します。

pub trait ProgressSink: Send + Sync {
    fn message(&self, message: &str);
}
