//! Observer: one per observed object or array.
//!
//! Design:
//! - The value holds its observer strongly (hidden slot); the observer holds
//!   its value weakly. No reference cycle forms between them.
//! - The observer is attached before children are walked, so cyclic graphs
//!   terminate: the second visit finds the observer already there.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::dep::Dep;
use super::reactive::define_reactive;
use crate::config;
use crate::domain::{ArrayRef, ObjectClass, ObjectRef, Value, WeakArrayRef, WeakObjectRef};

thread_local! {
    static SHOULD_OBSERVE: Cell<bool> = const { Cell::new(true) };
}

/// Turn creation of new observers on or off for the current thread.
///
/// Existing observers keep working. Nothing resets the flag; callers that
/// turn it off must turn it back on.
pub fn toggle_observing(enabled: bool) {
    SHOULD_OBSERVE.with(|flag| flag.set(enabled));
}

pub fn should_observe() -> bool {
    SHOULD_OBSERVE.with(|flag| flag.get())
}

/// An object or array an observer is (or can be) attached to.
#[derive(Clone, Debug)]
pub enum Observed {
    Object(ObjectRef),
    Array(ArrayRef),
}

impl Observed {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(obj) => Some(Observed::Object(obj.clone())),
            Value::Array(arr) => Some(Observed::Array(arr.clone())),
            _ => None,
        }
    }

    fn observer(&self) -> Option<Rc<Observer>> {
        match self {
            Observed::Object(obj) => obj.observer(),
            Observed::Array(arr) => arr.observer(),
        }
    }

    fn is_observable(&self) -> bool {
        match self {
            Observed::Object(obj) => obj.class() == ObjectClass::Plain && obj.is_extensible(),
            Observed::Array(arr) => arr.is_extensible(),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Observed::Object(obj) => Value::Object(obj),
            Observed::Array(arr) => Value::Array(arr),
        }
    }
}

enum WeakObserved {
    Object(WeakObjectRef),
    Array(WeakArrayRef),
}

pub struct Observer {
    value: WeakObserved,
    dep: Dep,
    /// Number of times the value was observed as root data.
    vm_count: Cell<usize>,
}

impl Observer {
    /// Attach a new observer to `target` and instrument it.
    ///
    /// `target` must be observable and carry no observer yet; use [`observe`].
    fn new(target: &Observed) -> Rc<Self> {
        let observer = Rc::new(Self {
            value: match target {
                Observed::Object(obj) => WeakObserved::Object(obj.downgrade()),
                Observed::Array(arr) => WeakObserved::Array(arr.downgrade()),
            },
            dep: Dep::new(),
            vm_count: Cell::new(0),
        });
        match target {
            Observed::Object(obj) => {
                obj.attach_observer(observer.clone());
                tracing::trace!(dep = %observer.dep.id(), keys = obj.len(), "observe object");
                observer.walk(obj);
            }
            Observed::Array(arr) => {
                arr.attach_observer(observer.clone());
                tracing::trace!(dep = %observer.dep.id(), len = arr.len(), "observe array");
                observer.observe_array(&arr.to_vec());
            }
        }
        observer
    }

    /// Instrument every enumerable own key of `obj`.
    pub fn walk(&self, obj: &ObjectRef) {
        for key in obj.keys() {
            define_reactive(obj, &key, None, None, false);
        }
    }

    /// Observe each of `items`.
    pub fn observe_array(&self, items: &[Value]) {
        for item in items {
            observe(item, false);
        }
    }

    /// Shape-level Dependency Set: key additions/removals and array mutations.
    pub fn dep(&self) -> &Dep {
        &self.dep
    }

    pub fn vm_count(&self) -> usize {
        self.vm_count.get()
    }

    /// The observed value, while it is still alive.
    pub fn value(&self) -> Option<Observed> {
        match &self.value {
            WeakObserved::Object(obj) => obj.upgrade().map(Observed::Object),
            WeakObserved::Array(arr) => arr.upgrade().map(Observed::Array),
        }
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("dep", &self.dep.id())
            .field("vm_count", &self.vm_count())
            .finish()
    }
}

/// Observer attached to `value`, without creating one.
pub fn observer_of(value: &Value) -> Option<Rc<Observer>> {
    Observed::from_value(value).and_then(|target| target.observer())
}

/// Attach an observer to `value`, or return the one already attached.
///
/// Primitives, virtual nodes, framework instances, non-plain and
/// non-extensible objects get no observer, and neither does anything while
/// observation is toggled off or during a server rendering pass.
/// `as_root_data` bumps the observer's root-usage count.
pub fn observe(value: &Value, as_root_data: bool) -> Option<Rc<Observer>> {
    let target = Observed::from_value(value)?;
    if let Observed::Object(obj) = &target
        && obj.class() == ObjectClass::VNode
    {
        return None;
    }

    let observer = match target.observer() {
        Some(existing) => Some(existing),
        None if should_observe() && !config::config().server_rendering && target.is_observable() => {
            Some(Observer::new(&target))
        }
        None => {
            tracing::debug!(kind = value.type_name(), "observation refused");
            None
        }
    };

    if as_root_data && let Some(observer) = &observer {
        observer.vm_count.set(observer.vm_count.get() + 1);
    }
    observer
}
