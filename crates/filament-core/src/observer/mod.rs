//! Observer - 依存追跡エンジン本体
//!
//! # 構成
//! - **dep**: Dependency Set（購読者の集合と通知）
//! - **tracking**: 評価中の購読者スロット（token で退避・復元）
//! - **reactive**: フィールド単位の interceptor（`define_reactive`）
//! - **observe**: オブジェクト・配列単位の Observer と `observe`
//! - **array**: 配列の破壊的メソッド（挿入要素の observe と通知）
//! - **mutate**: キーの追加・削除（`set` / `del`）
//!
//! 依存の登録は読み取り時にボトムアップで行われます。ネストしたフィールドを
//! 読むと、葉のフィールドの Dep から経路上の各 Observer の Dep まで登録されます。

pub mod array;
pub mod dep;
pub mod mutate;
pub mod observe;
pub mod reactive;
pub mod tracking;

pub use self::dep::Dep;
pub use self::mutate::{del, set};
pub use self::observe::{Observed, Observer, observe, observer_of, should_observe, toggle_observing};
pub use self::reactive::{DiagnosticHook, define_reactive, depend_array};
pub use self::tracking::{
    EvaluationToken, active_subscriber, begin_evaluation, end_evaluation, is_tracking, untracked,
};
