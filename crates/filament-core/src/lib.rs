//! filament-core
//!
//! Fine-grained reactive dependency tracking over a plain data graph.
//!
//! Reads of instrumented fields register the subscriber that is currently
//! evaluating; writes notify exactly the subscribers that read the field (or
//! the shape of the object or array holding it).
//!
//! # モジュール構成
//! - **domain**: データグラフ（Value, ObjectRef, ArrayRef, Key, ids）
//! - **observer**: Dep, define_reactive, Observer/observe, 配列メソッド, set/del
//! - **ports**: 外部との境界（Subscriber, DiagnosticSink）
//! - **config**: ReactiveConfig（SSR 判定、診断の有効化）
//! - **diagnostics**: misuse の診断（例外ではなくサイドチャネル）
//!
//! # Example
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use filament_core::{Subscriber, SubscriberId, Value, begin_evaluation, end_evaluation, observe};
//!
//! struct Render { id: SubscriberId, runs: Cell<u32> }
//!
//! impl Subscriber for Render {
//!     fn id(&self) -> SubscriberId { self.id }
//!     fn notify(&self) { self.runs.set(self.runs.get() + 1) }
//! }
//!
//! let state = Value::from(serde_json::json!({ "count": 1 }));
//! observe(&state, true);
//! let obj = state.as_object().unwrap();
//!
//! let render = Rc::new(Render { id: SubscriberId::next(), runs: Cell::new(0) });
//! let token = begin_evaluation(Some(render.clone()));
//! let _ = obj.get("count");
//! end_evaluation(token);
//!
//! obj.set("count", Value::from(2));
//! assert_eq!(render.runs.get(), 1);
//! ```

pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod observer;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ConfigError, DEFAULT_MAX_ARRAY_LEN, ReactiveConfig, config, configure};
pub use diagnostics::{Diagnostic, install_sink};
pub use domain::{
    ArrayRef, DepId, Descriptor, Getter, Key, MAX_ARRAY_INDEX, ObjectClass, ObjectRef, PropertyKind,
    Setter, SubscriberId, Value,
};
pub use observer::{
    Dep, DiagnosticHook, EvaluationToken, Observed, Observer, active_subscriber, begin_evaluation,
    define_reactive, del, depend_array, end_evaluation, is_tracking, observe, observer_of, set,
    should_observe, toggle_observing, untracked,
};
pub use ports::{DiagnosticSink, RecordingSink, Subscriber, TracingSink};
