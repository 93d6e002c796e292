//! Ports - 外部コラボレータとの境界
//!
//! エンジンは購読者（再計算の主体）と診断の出力先を持たず、
//! ホスト側（スケジューラ）がこれらの trait を実装して差し込みます。

pub mod diagnostic_sink;
pub mod subscriber;

// 主要な trait を再エクスポート
pub use self::diagnostic_sink::{DiagnosticSink, RecordingSink, TracingSink};
pub use self::subscriber::Subscriber;
