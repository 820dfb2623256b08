//! Status - 実行状態
//!
//! 状態遷移は一方向のみ:
//! Idle → Listing → Sorting → Deleting(1 件ずつ) → Done | Failed
//!
//! リトライもキャンセルもないので、Failed に入ったらその実行は終わりです。

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Listing,
    Sorting,
    /// Processing the `index`-th image of a deletion set of `total`.
    Deleting { index: usize, total: usize },
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Listing => f.write_str("listing"),
            Self::Sorting => f.write_str("sorting"),
            Self::Deleting { index, total } => write!(f, "deleting({}/{})", index + 1, total),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Shared handle on the state of a run.
///
/// - clone したハンドルはすべて同じ状態を指す
/// - `subscribe()` で watch::Receiver を取れば遷移を外から観測できる
#[derive(Debug, Clone)]
pub struct RunStatus {
    tx: Arc<watch::Sender<RunState>>,
}

impl RunStatus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RunState::Idle);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> RunState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.tx.subscribe()
    }

    pub fn advance(&self, next: RunState) {
        // receiver がいなくても値は更新される
        let prev = self.tx.send_replace(next);
        debug!(from = %prev, to = %next, "run state changed");
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::new()
    }
}
