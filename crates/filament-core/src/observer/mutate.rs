//! Structural mutation: adding and deleting keys after observation.
//!
//! Field interceptors only cover keys that existed when the object was walked.
//! `set` and `del` are the sanctioned way to change an object's shape so that
//! subscribers of the shape-level Dep hear about it.

use super::reactive::define_reactive;
use crate::config;
use crate::diagnostics::{self, Diagnostic};
use crate::domain::{Key, ObjectClass, ObjectRef, Value};

/// Set `key` on `target`, adding a reactive field if the key is new.
///
/// - Array + valid index: grow to the index and splice the value in (observed
///   and notified through the array mutators). Growth beyond
///   `ReactiveConfig::max_array_len`, or that the allocator refuses, is
///   diagnosed and nothing is written.
/// - Existing own key: plain write, already reactive via its interceptor.
/// - Framework instance or root data: the write lands as a plain, untracked
///   property and a diagnostic is emitted.
/// - Unobserved object: plain write, nothing to notify.
/// - Otherwise: install an interceptor for `key`, then notify the shape Dep.
///   A non-extensible target takes no new key and nobody is notified.
///
/// Primitive targets are diagnosed and left alone. Returns `value`.
pub fn set(target: &Value, key: impl Into<Key>, value: Value) -> Value {
    let key = key.into();
    match target {
        Value::Array(arr) => {
            let Some(index) = key.as_index() else {
                diagnostics::emit(Diagnostic::NonIndexKeyOnArray {
                    key: key.to_string(),
                });
                return value;
            };
            let len = arr.len();
            if index >= len && (index >= config::config().max_array_len || !arr.set_len(index)) {
                diagnostics::emit(Diagnostic::ArrayGrowthRefused { index, len });
                return value;
            }
            arr.splice(index, 1, [value.clone()]);
            value
        }
        Value::Object(obj) => {
            set_on_object(obj, &key.as_name(), value.clone());
            value
        }
        primitive => {
            diagnostics::emit(Diagnostic::SetOnPrimitive {
                target: describe(primitive),
            });
            value
        }
    }
}

fn set_on_object(obj: &ObjectRef, key: &str, value: Value) {
    if obj.has_own(key) {
        obj.set(key, value);
        return;
    }
    let observer = obj.observer();
    if is_root_data(obj, observer.as_ref().map(|o| o.vm_count())) {
        diagnostics::emit(Diagnostic::AddToRootData {
            key: key.to_string(),
        });
        obj.set(key, value);
        return;
    }
    let Some(observer) = observer else {
        obj.set(key, value);
        return;
    };
    if define_reactive(obj, key, Some(value), None, false).is_none() {
        return;
    }
    tracing::trace!(key, dep = %observer.dep().id(), "reactive key added");
    observer.dep().notify();
}

/// Delete `key` from `target`, notifying the shape Dep if it is observed.
///
/// Array indices go through `splice`. Deleting from a framework instance or
/// root data is diagnosed; the key is still removed but nobody is notified.
/// Primitive targets are diagnosed and left alone.
pub fn del(target: &Value, key: impl Into<Key>) {
    let key = key.into();
    match target {
        Value::Array(arr) => match key.as_index() {
            Some(index) => {
                arr.splice(index, 1, []);
            }
            None => diagnostics::emit(Diagnostic::NonIndexKeyOnArray {
                key: key.to_string(),
            }),
        },
        Value::Object(obj) => del_on_object(obj, &key.as_name()),
        primitive => diagnostics::emit(Diagnostic::DeleteOnPrimitive {
            target: describe(primitive),
        }),
    }
}

fn del_on_object(obj: &ObjectRef, key: &str) {
    let observer = obj.observer();
    if is_root_data(obj, observer.as_ref().map(|o| o.vm_count())) {
        diagnostics::emit(Diagnostic::DeleteFromRootData {
            key: key.to_string(),
        });
        obj.delete(key);
        return;
    }
    if !obj.has_own(key) {
        return;
    }
    if !obj.delete(key) {
        return;
    }
    if let Some(observer) = observer {
        tracing::trace!(key, dep = %observer.dep().id(), "reactive key deleted");
        observer.dep().notify();
    }
}

fn is_root_data(obj: &ObjectRef, vm_count: Option<usize>) -> bool {
    obj.class() == ObjectClass::Instance || vm_count.is_some_and(|n| n > 0)
}

fn describe(value: &Value) -> String {
    match value {
        Value::Undefined | Value::Null => value.type_name().to_string(),
        other => format!("{} {}", other.type_name(), other.to_display_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReactiveConfig, configure};
    use crate::diagnostics::install_sink;
    use crate::domain::ArrayRef;
    use crate::observer::observe;
    use crate::ports::{RecordingSink, Subscriber};
    use crate::testing::{CountingSubscriber, read_as};
    use rstest::rstest;
    use serde_json::json;
    use std::rc::Rc;

    fn recording() -> Rc<RecordingSink> {
        let sink = Rc::new(RecordingSink::new());
        install_sink(sink.clone());
        sink
    }

    #[test]
    fn new_key_becomes_reactive_and_notifies_shape() {
        let value = Value::from(json!({ "a": 1 }));
        let observer = observe(&value, false).unwrap();
        let obj = value.as_object().unwrap();
        let shape = CountingSubscriber::new();
        read_as(&shape, || observer.dep().depend());

        set(&value, "b", Value::from(5));

        assert_eq!(shape.count(), 1);
        assert_eq!(obj.get("b"), Value::from(5));
        let field = CountingSubscriber::new();
        read_as(&field, || obj.get("b"));
        obj.set("b", Value::from(6));
        assert_eq!(field.count(), 1);
    }

    #[test]
    fn existing_key_is_a_plain_reactive_write() {
        let value = Value::from(json!({ "a": 1 }));
        let observer = observe(&value, false).unwrap();
        let obj = value.as_object().unwrap();
        let shape = CountingSubscriber::new();
        let field = CountingSubscriber::new();
        read_as(&shape, || observer.dep().depend());
        read_as(&field, || obj.get("a"));

        set(&value, "a", Value::from(2));

        assert!(obj.field_dep("a").unwrap().contains(field.id()));
        assert_eq!(field.count(), 1);
        // the field write also reaches the shape Dep, once
        assert_eq!(shape.count(), 1);
    }

    #[test]
    fn unobserved_object_gets_plain_write() {
        let obj = ObjectRef::new();

        set(&obj.clone().into(), "a", Value::from(1));

        assert_eq!(obj.get("a"), Value::from(1));
        assert!(obj.field_dep("a").is_none());
    }

    #[test]
    fn root_data_add_is_diagnosed_and_untracked() {
        let sink = recording();
        let value = Value::from(json!({ "a": 1 }));
        observe(&value, true);
        let obj = value.as_object().unwrap();

        set(&value, "fresh", Value::from(1));

        assert_eq!(
            sink.take(),
            vec![Diagnostic::AddToRootData { key: "fresh".into() }]
        );
        assert_eq!(obj.get("fresh"), Value::from(1));
        assert!(obj.field_dep("fresh").is_none());
    }

    #[test]
    fn instance_target_is_treated_as_root_data() {
        let sink = recording();
        let vm = ObjectRef::with_class(ObjectClass::Instance);

        set(&vm.clone().into(), "x", Value::from(1));
        del(&vm.clone().into(), "x");

        assert_eq!(sink.len(), 2);
        assert!(!vm.has_own("x"));
    }

    #[test]
    fn array_index_set_splices_and_notifies() {
        let arr: ArrayRef = [1, 2].into_iter().map(Value::from).collect();
        let observer = observe(&arr.clone().into(), false).unwrap();
        let sub = CountingSubscriber::new();
        read_as(&sub, || observer.dep().depend());

        set(&arr.clone().into(), 0usize, Value::from(9));
        set(&arr.clone().into(), "4", Value::from(7));

        assert_eq!(sub.count(), 2);
        assert_eq!(
            arr.to_vec(),
            vec![
                Value::from(9),
                Value::from(2),
                Value::Undefined,
                Value::Undefined,
                Value::from(7)
            ]
        );
    }

    #[rstest]
    #[case::exponent(Key::from("1e19"))]
    #[case::past_largest_index(Key::from("4294967295"))]
    #[case::usize_max(Key::Index(usize::MAX))]
    fn out_of_range_array_key_is_diagnosed_without_writing(#[case] key: Key) {
        let sink = recording();
        let arr: ArrayRef = [1].into_iter().map(Value::from).collect();
        let observer = observe(&arr.clone().into(), false).unwrap();
        let sub = CountingSubscriber::new();
        read_as(&sub, || observer.dep().depend());
        let shown = key.to_string();

        set(&arr.clone().into(), key.clone(), Value::from(2));
        del(&arr.clone().into(), key);

        assert_eq!(arr.to_vec(), vec![Value::from(1)]);
        assert_eq!(sub.count(), 0);
        assert_eq!(
            sink.take(),
            vec![
                Diagnostic::NonIndexKeyOnArray { key: shown.clone() },
                Diagnostic::NonIndexKeyOnArray { key: shown },
            ]
        );
    }

    #[test]
    fn growth_past_configured_limit_is_refused() {
        let sink = recording();
        configure(ReactiveConfig {
            max_array_len: 8,
            ..ReactiveConfig::default()
        });
        let arr: ArrayRef = [1, 2].into_iter().map(Value::from).collect();
        let observer = observe(&arr.clone().into(), false).unwrap();
        let sub = CountingSubscriber::new();
        read_as(&sub, || observer.dep().depend());

        set(&arr.clone().into(), 100usize, Value::from(9));
        assert_eq!(arr.len(), 2);
        assert_eq!(sub.count(), 0);
        assert_eq!(
            sink.take(),
            vec![Diagnostic::ArrayGrowthRefused { index: 100, len: 2 }]
        );

        set(&arr.clone().into(), 5usize, Value::from(9));
        assert_eq!(arr.len(), 6);
        assert_eq!(sub.count(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn non_extensible_observed_object_takes_no_key_and_notifies_nobody() {
        let value = Value::from(json!({ "a": 1 }));
        let observer = observe(&value, false).unwrap();
        let obj = value.as_object().unwrap();
        obj.prevent_extensions();
        let shape = CountingSubscriber::new();
        read_as(&shape, || observer.dep().depend());

        let returned = set(&value, "b", Value::from(2));

        assert_eq!(returned, Value::from(2));
        assert!(!obj.has_own("b"));
        assert_eq!(shape.count(), 0);
    }

    #[test]
    fn array_with_named_key_is_diagnosed() {
        let sink = recording();
        let arr = ArrayRef::new();

        set(&arr.clone().into(), "name", Value::from(1));
        del(&arr.into(), "name");

        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn primitive_targets_are_diagnosed() {
        let sink = recording();

        let returned = set(&Value::Undefined, "a", Value::from(1));
        del(&Value::from(3), "a");

        assert_eq!(returned, Value::from(1));
        assert_eq!(
            sink.take(),
            vec![
                Diagnostic::SetOnPrimitive { target: "undefined".into() },
                Diagnostic::DeleteOnPrimitive { target: "number 3".into() },
            ]
        );
    }

    #[test]
    fn del_removes_key_and_notifies_shape() {
        let value = Value::from(json!({ "a": 1, "b": 2 }));
        let observer = observe(&value, false).unwrap();
        let sub = CountingSubscriber::new();
        read_as(&sub, || observer.dep().depend());

        del(&value, "a");
        del(&value, "missing");

        assert_eq!(sub.count(), 1);
        assert_eq!(value.as_object().unwrap().keys(), vec!["b".to_string()]);
    }

    #[test]
    fn del_on_root_data_removes_without_notifying() {
        let sink = recording();
        let value = Value::from(json!({ "a": 1 }));
        let observer = observe(&value, true).unwrap();
        let sub = CountingSubscriber::new();
        read_as(&sub, || observer.dep().depend());

        del(&value, "a");

        assert_eq!(sub.count(), 0);
        assert!(!value.as_object().unwrap().has_own("a"));
        assert_eq!(sink.take(), vec![Diagnostic::DeleteFromRootData { key: "a".into() }]);
    }

    #[test]
    fn del_array_index_splices() {
        let arr: ArrayRef = [1, 2, 3].into_iter().map(Value::from).collect();
        observe(&arr.clone().into(), false);

        del(&arr.clone().into(), 1usize);

        assert_eq!(arr.to_vec(), vec![Value::from(1), Value::from(3)]);
    }
}
