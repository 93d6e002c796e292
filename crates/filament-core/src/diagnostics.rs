//! Misuse diagnostics.
//!
//! Diagnostics never abort the caller. They are emitted only when
//! `ReactiveConfig::diagnostics` is on, to the sink installed for the thread
//! (`TracingSink` unless replaced).

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::config;
use crate::ports::{DiagnosticSink, TracingSink};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("cannot set reactive property on undefined, null, or primitive value: {target}")]
    SetOnPrimitive { target: String },

    #[error("cannot delete reactive property on undefined, null, or primitive value: {target}")]
    DeleteOnPrimitive { target: String },

    #[error(
        "avoid adding reactive property `{key}` to a framework instance or its root data at runtime; declare it upfront"
    )]
    AddToRootData { key: String },

    #[error("avoid deleting property `{key}` on a framework instance or its root data; set it to null instead")]
    DeleteFromRootData { key: String },

    #[error("`{key}` is not a valid array index")]
    NonIndexKeyOnArray { key: String },

    #[error("refusing to grow array from {len} to hold index {index}")]
    ArrayGrowthRefused { index: usize, len: usize },

    #[error("array was written to by its own sort comparator; {discarded} element(s) discarded")]
    MutatedDuringSort { discarded: usize },
}

impl Diagnostic {
    /// Short machine-readable name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::SetOnPrimitive { .. } => "set_on_primitive",
            Diagnostic::DeleteOnPrimitive { .. } => "delete_on_primitive",
            Diagnostic::AddToRootData { .. } => "add_to_root_data",
            Diagnostic::DeleteFromRootData { .. } => "delete_from_root_data",
            Diagnostic::NonIndexKeyOnArray { .. } => "non_index_key_on_array",
            Diagnostic::ArrayGrowthRefused { .. } => "array_growth_refused",
            Diagnostic::MutatedDuringSort { .. } => "mutated_during_sort",
        }
    }
}

thread_local! {
    static SINK: RefCell<Rc<dyn DiagnosticSink>> = RefCell::new(Rc::new(TracingSink) as Rc<dyn DiagnosticSink>);
}

/// Replace the sink for the current thread, returning the previous one.
pub fn install_sink(sink: Rc<dyn DiagnosticSink>) -> Rc<dyn DiagnosticSink> {
    SINK.with(|slot| slot.replace(sink))
}

/// Emit `diagnostic` unless diagnostics are turned off.
pub fn emit(diagnostic: Diagnostic) {
    if !config::config().diagnostics {
        return;
    }
    // Clone the handle out so a sink may install another sink while emitting.
    let sink = SINK.with(|slot| slot.borrow().clone());
    sink.emit(&diagnostic);
}
