//! Mutating array methods.
//!
//! Every length- or order-changing operation goes through these methods. On
//! an observed array each call performs the mutation, observes the inserted
//! elements and then notifies the array's shape-level Dep. On an unobserved
//! array they are plain mutations.

use std::cmp::Ordering;

use crate::diagnostics::{self, Diagnostic};
use crate::domain::{ArrayRef, Value};

impl ArrayRef {
    /// Append `items`, returning the new length.
    pub fn push(&self, items: impl IntoIterator<Item = Value>) -> usize {
        let inserted: Vec<Value> = items.into_iter().collect();
        let len = {
            let mut data = self.0.borrow_mut();
            data.items.extend(inserted.iter().cloned());
            data.items.len()
        };
        self.after_mutation(&inserted);
        len
    }

    /// Remove and return the last element (`Undefined` when empty).
    pub fn pop(&self) -> Value {
        let removed = self.0.borrow_mut().items.pop().unwrap_or_default();
        self.after_mutation(&[]);
        removed
    }

    /// Remove and return the first element (`Undefined` when empty).
    pub fn shift(&self) -> Value {
        let removed = {
            let mut data = self.0.borrow_mut();
            if data.items.is_empty() {
                Value::Undefined
            } else {
                data.items.remove(0)
            }
        };
        self.after_mutation(&[]);
        removed
    }

    /// Prepend `items`, returning the new length.
    pub fn unshift(&self, items: impl IntoIterator<Item = Value>) -> usize {
        let inserted: Vec<Value> = items.into_iter().collect();
        let len = {
            let mut data = self.0.borrow_mut();
            data.items.splice(0..0, inserted.iter().cloned());
            data.items.len()
        };
        self.after_mutation(&inserted);
        len
    }

    /// Remove `delete_count` elements at `start` and insert `items` there.
    ///
    /// `start` is clamped to the length and `delete_count` to what is left.
    /// Returns the removed elements.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        items: impl IntoIterator<Item = Value>,
    ) -> Vec<Value> {
        let inserted: Vec<Value> = items.into_iter().collect();
        let removed = {
            let mut data = self.0.borrow_mut();
            let start = start.min(data.items.len());
            let end = start + delete_count.min(data.items.len() - start);
            data.items
                .splice(start..end, inserted.iter().cloned())
                .collect()
        };
        self.after_mutation(&inserted);
        removed
    }

    /// Sort by string form, `Undefined` last.
    pub fn sort(&self) {
        self.sort_by(|a, b| match (a, b) {
            (Value::Undefined, Value::Undefined) => Ordering::Equal,
            (Value::Undefined, _) => Ordering::Greater,
            (_, Value::Undefined) => Ordering::Less,
            _ => a.to_display_string().cmp(&b.to_display_string()),
        });
    }

    /// Stable sort with `compare`.
    ///
    /// The elements are taken out while sorting: `compare` sees this array as
    /// empty if it reads it. Anything `compare` writes into this array is
    /// discarded when the sorted elements are put back, and diagnosed.
    pub fn sort_by<F>(&self, compare: F)
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        let mut items = std::mem::take(&mut self.0.borrow_mut().items);
        items.sort_by(compare);
        let written = std::mem::replace(&mut self.0.borrow_mut().items, items);
        if !written.is_empty() {
            diagnostics::emit(Diagnostic::MutatedDuringSort {
                discarded: written.len(),
            });
        }
        self.after_mutation(&[]);
    }

    pub fn reverse(&self) {
        self.0.borrow_mut().items.reverse();
        self.after_mutation(&[]);
    }

    fn after_mutation(&self, inserted: &[Value]) {
        if let Some(observer) = self.observer() {
            observer.observe_array(inserted);
            observer.dep().notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::install_sink;
    use crate::domain::ObjectRef;
    use crate::observer::{observe, observer_of, set};
    use crate::ports::RecordingSink;
    use crate::testing::{CountingSubscriber, read_as};
    use rstest::rstest;
    use std::cell::Cell;
    use std::rc::Rc;

    fn numbers(values: &[i32]) -> ArrayRef {
        values.iter().copied().map(Value::from).collect()
    }

    fn observed_with_subscriber(arr: &ArrayRef) -> std::rc::Rc<CountingSubscriber> {
        let observer = observe(&arr.clone().into(), false).unwrap();
        let sub = CountingSubscriber::new();
        read_as(&sub, || observer.dep().depend());
        sub
    }

    #[rstest]
    #[case::push(|a: &ArrayRef| { a.push([Value::from(4)]); }, vec![1, 2, 3, 4])]
    #[case::pop(|a: &ArrayRef| { a.pop(); }, vec![1, 2])]
    #[case::shift(|a: &ArrayRef| { a.shift(); }, vec![2, 3])]
    #[case::unshift(|a: &ArrayRef| { a.unshift([Value::from(0)]); }, vec![0, 1, 2, 3])]
    #[case::splice(|a: &ArrayRef| { a.splice(1, 1, [Value::from(9)]); }, vec![1, 9, 3])]
    #[case::sort(|a: &ArrayRef| a.sort_by(|x, y| y.as_number().partial_cmp(&x.as_number()).unwrap()), vec![3, 2, 1])]
    #[case::reverse(|a: &ArrayRef| a.reverse(), vec![3, 2, 1])]
    fn every_mutator_notifies_once(#[case] mutate: fn(&ArrayRef), #[case] expected: Vec<i32>) {
        let arr = numbers(&[1, 2, 3]);
        let sub = observed_with_subscriber(&arr);

        mutate(&arr);

        assert_eq!(sub.count(), 1);
        assert_eq!(arr.to_vec(), numbers(&expected).to_vec());
    }

    #[test]
    fn unobserved_array_mutates_silently() {
        let arr = numbers(&[1]);
        let item = ObjectRef::new();

        arr.push([item.clone().into()]);

        assert_eq!(arr.len(), 2);
        assert!(item.observer().is_none());
    }

    #[rstest]
    #[case::push(|a: &ArrayRef, v: Value| { a.push([v]); })]
    #[case::unshift(|a: &ArrayRef, v: Value| { a.unshift([v]); })]
    #[case::splice(|a: &ArrayRef, v: Value| { a.splice(1, 0, [v]); })]
    #[case::set_in_range(|a: &ArrayRef, v: Value| { set(&a.clone().into(), 0usize, v); })]
    #[case::set_past_end(|a: &ArrayRef, v: Value| { set(&a.clone().into(), 5usize, v); })]
    fn every_insert_path_observes_objects(#[case] insert: fn(&ArrayRef, Value)) {
        let arr = numbers(&[1, 2]);
        observe(&arr.clone().into(), false);
        let item = ObjectRef::from_entries([("a", Value::from(1))]);

        insert(&arr, item.clone().into());

        assert!(observer_of(&item.clone().into()).is_some());
        assert!(item.field_dep("a").is_some());
        assert!(arr.to_vec().iter().any(|v| v.as_object().is_some_and(|o| o.ptr_eq(&item))));
    }

    #[test]
    fn writes_from_sort_comparator_are_discarded_and_diagnosed() {
        let sink = Rc::new(RecordingSink::new());
        install_sink(sink.clone());
        let arr = numbers(&[3, 1, 2]);
        let sub = observed_with_subscriber(&arr);
        let same = arr.clone();
        let wrote = Cell::new(false);

        arr.sort_by(|x, y| {
            if !wrote.replace(true) {
                same.push([Value::from(99)]);
            }
            x.as_number().partial_cmp(&y.as_number()).unwrap()
        });

        assert_eq!(arr.to_vec(), numbers(&[1, 2, 3]).to_vec());
        assert_eq!(
            sink.take(),
            vec![Diagnostic::MutatedDuringSort { discarded: 1 }]
        );
        // the comparator's push and the sort itself
        assert_eq!(sub.count(), 2);
    }

    #[test]
    fn splice_clamps_range_and_returns_removed() {
        let arr = numbers(&[1, 2, 3]);

        let removed = arr.splice(2, 10, []);
        assert_eq!(removed, vec![Value::from(3)]);

        let removed = arr.splice(10, 1, [Value::from(4)]);
        assert!(removed.is_empty());
        assert_eq!(arr.to_vec(), numbers(&[1, 2, 4]).to_vec());
    }

    #[test]
    fn pop_and_shift_on_empty_still_notify() {
        let arr = ArrayRef::new();
        let sub = observed_with_subscriber(&arr);

        assert_eq!(arr.pop(), Value::Undefined);
        assert_eq!(arr.shift(), Value::Undefined);

        assert_eq!(sub.count(), 2);
    }

    #[test]
    fn default_sort_uses_string_order_with_undefined_last() {
        let arr = ArrayRef::from_vec(vec![
            Value::Undefined,
            Value::from(10),
            Value::from(9),
            Value::from("a"),
        ]);

        arr.sort();

        assert_eq!(
            arr.to_vec(),
            vec![Value::from(10), Value::from(9), Value::from("a"), Value::Undefined]
        );
    }
}
