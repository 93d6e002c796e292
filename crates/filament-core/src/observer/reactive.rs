//! Field interceptor: a tracked accessor pair over one field of one object.

use std::cell::RefCell;
use std::rc::Rc;

use super::dep::Dep;
use super::observe::{Observer, observe};
use super::tracking;
use crate::config;
use crate::domain::{ArrayRef, Descriptor, Getter, ObjectRef, Setter, Value};

/// Called before a changed value is written, in development builds only.
pub type DiagnosticHook = Rc<dyn Fn()>;

/// State closed over by the accessor pair of one field.
struct FieldState {
    /// Private slot, unused when a pre-existing getter is delegated to.
    value: RefCell<Value>,
    child: RefCell<Option<Rc<Observer>>>,
}

/// Instrument `key` on `obj` with a tracked accessor pair.
///
/// - A non-configurable field is left alone (`None`).
/// - A pre-existing accessor pair is delegated to; a getter without a setter
///   makes the field read-only and writes are dropped silently.
/// - `value` overrides the current field value; without it the current value
///   is read (unless only a getter exists).
/// - Unless `shallow`, the value is observed and its observer is cached; the
///   cache is refreshed on every write.
/// - A changed write notifies the field's Dep, then the shape Dep of `obj`'s
///   observer, so whoever read the parent field holding `obj` hears about it.
///
/// Returns the field's Dependency Set.
pub fn define_reactive(
    obj: &ObjectRef,
    key: &str,
    value: Option<Value>,
    custom_setter: Option<DiagnosticHook>,
    shallow: bool,
) -> Option<Dep> {
    let existing = obj.own_descriptor(key);
    if existing.as_ref().is_some_and(|desc| !desc.configurable) {
        return None;
    }

    let getter = existing.as_ref().and_then(Descriptor::getter);
    let setter = existing.as_ref().and_then(Descriptor::setter);
    let initial = match value {
        Some(v) => v,
        None if getter.is_none() || setter.is_some() => obj.get(key),
        None => Value::Undefined,
    };

    let dep = Dep::new();
    let state = Rc::new(FieldState {
        child: RefCell::new(if shallow {
            None
        } else {
            observe(&initial, false)
        }),
        value: RefCell::new(initial),
    });

    let get: Getter = {
        let dep = dep.clone();
        let state = state.clone();
        let getter = getter.clone();
        Rc::new(move |obj: &ObjectRef| {
            let value = match &getter {
                Some(get) => get(obj),
                None => state.value.borrow().clone(),
            };
            if tracking::is_tracking() {
                dep.depend();
                let child = state.child.borrow().clone();
                if let Some(child) = child {
                    child.dep().depend();
                    if let Value::Array(arr) = &value {
                        depend_array(arr);
                    }
                }
            }
            value
        })
    };

    let set: Setter = {
        let dep = dep.clone();
        Rc::new(move |obj: &ObjectRef, new_value: Value| {
            let current = match &getter {
                Some(get) => get(obj),
                None => state.value.borrow().clone(),
            };
            if Value::same_value(&new_value, &current) {
                return;
            }
            if let Some(hook) = &custom_setter
                && config::config().diagnostics
            {
                hook();
            }
            match (&getter, &setter) {
                (Some(_), None) => return,
                (_, Some(set)) => set(obj, new_value.clone()),
                (None, None) => *state.value.borrow_mut() = new_value.clone(),
            }
            let child = if shallow {
                None
            } else {
                observe(&new_value, false)
            };
            *state.child.borrow_mut() = child;
            dep.notify();
            // Readers of the field holding `obj` registered on its shape Dep.
            if let Some(owner) = obj.observer() {
                owner.dep().notify();
            }
        })
    };

    let mut desc = Descriptor::accessor(Some(get), Some(set));
    desc.dep = Some(dep.clone());
    if obj.define_property(key, desc) {
        Some(dep)
    } else {
        // Non-extensible object and a new key.
        None
    }
}

/// Register the active subscriber on every observed element of `arr`,
/// descending into nested arrays.
///
/// Array slots cannot carry interceptors, so a read of the array stands in
/// for reads of its elements.
pub fn depend_array(arr: &ArrayRef) {
    for item in arr.to_vec() {
        let observer = match &item {
            Value::Object(obj) => obj.observer(),
            Value::Array(inner) => inner.observer(),
            _ => None,
        };
        if let Some(observer) = observer {
            observer.dep().depend();
        }
        if let Value::Array(inner) = &item {
            depend_array(inner);
        }
    }
}
