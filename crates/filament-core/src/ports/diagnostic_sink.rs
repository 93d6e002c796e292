//! DiagnosticSink port - 診断の出力先
//!
//! # 実装
//! - TracingSink: `tracing::warn!` で出力（デフォルト）
//! - RecordingSink: 受け取った診断を保持（テスト・ツール用）

use std::cell::RefCell;

use crate::diagnostics::Diagnostic;

/// DiagnosticSink は misuse の診断を受け取る
///
/// 診断は戻り値の一部ではなく、サイドチャネルとしてここに流れます。
pub trait DiagnosticSink {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Logs every diagnostic as a `WARN` event on target `filament::observer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        tracing::warn!(
            target: "filament::observer",
            kind = diagnostic.kind(),
            "{diagnostic}"
        );
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    seen: RefCell<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.seen.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        self.seen.borrow_mut().push(diagnostic.clone());
    }
}
