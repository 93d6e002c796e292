//! Array storage.
//!
//! This module only holds the raw storage and the plain (non-notifying)
//! accessors. The mutating methods that observe inserted elements and notify
//! live in `observer::array`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::value::Value;
use crate::observer::Observer;

pub(crate) struct ArrayData {
    pub(crate) items: Vec<Value>,
    extensible: bool,
    observer: Option<Rc<Observer>>,
}

/// Shared handle to an array. Clones alias the same array.
///
/// Extensibility only gates observation; the mutators still work on a
/// non-extensible array.
#[derive(Clone)]
pub struct ArrayRef(pub(crate) Rc<RefCell<ArrayData>>);

/// Non-owning handle to an array.
#[derive(Clone)]
pub struct WeakArrayRef(Weak<RefCell<ArrayData>>);

impl WeakArrayRef {
    pub fn upgrade(&self) -> Option<ArrayRef> {
        self.0.upgrade().map(ArrayRef)
    }
}

impl ArrayRef {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(ArrayData {
            items,
            extensible: true,
            observer: None,
        })))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, `Undefined` when out of range.
    pub fn get(&self, index: usize) -> Value {
        self.0
            .borrow()
            .items
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().items.clone()
    }

    /// Plain index write, padding with `Undefined` past the end.
    ///
    /// Does not notify: use `splice` or `crate::set` for a tracked write.
    /// Returns `false`, leaving the array untouched, when it cannot grow to
    /// hold `index`.
    pub fn set_index(&self, index: usize, value: Value) -> bool {
        let Some(len) = index.checked_add(1) else {
            return false;
        };
        let mut data = self.0.borrow_mut();
        if index >= data.items.len() && !grow(&mut data.items, len) {
            return false;
        }
        data.items[index] = value;
        true
    }

    /// Plain length write: truncates or pads with `Undefined`. Does not notify.
    ///
    /// Returns `false`, leaving the array untouched, when it cannot grow to `len`.
    pub fn set_len(&self, len: usize) -> bool {
        let mut data = self.0.borrow_mut();
        if len > data.items.len() {
            return grow(&mut data.items, len);
        }
        data.items.truncate(len);
        true
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakArrayRef {
        WeakArrayRef(Rc::downgrade(&self.0))
    }

    pub fn prevent_extensions(&self) {
        self.0.borrow_mut().extensible = false;
    }

    pub fn is_extensible(&self) -> bool {
        self.0.borrow().extensible
    }

    pub(crate) fn observer(&self) -> Option<Rc<Observer>> {
        self.0.borrow().observer.clone()
    }

    pub(crate) fn attach_observer(&self, observer: Rc<Observer>) {
        self.0.borrow_mut().observer = Some(observer);
    }
}

fn grow(items: &mut Vec<Value>, len: usize) -> bool {
    if items.try_reserve_exact(len - items.len()).is_err() {
        return false;
    }
    items.resize(len, Value::Undefined);
    true
}

impl Default for ArrayRef {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Value> for ArrayRef {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("ArrayRef")
            .field("len", &data.items.len())
            .field("observed", &data.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_are_undefined() {
        let arr = ArrayRef::from_vec(vec![Value::from(1)]);

        assert_eq!(arr.get(0), Value::from(1));
        assert_eq!(arr.get(5), Value::Undefined);
    }

    #[test]
    fn set_index_pads_with_undefined() {
        let arr = ArrayRef::new();
        assert!(arr.set_index(2, Value::from("x")));

        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get(0), Value::Undefined);
        assert_eq!(arr.get(2), Value::from("x"));
    }

    #[test]
    fn set_len_truncates() {
        let arr: ArrayRef = (0..5i32).map(Value::from).collect();
        assert!(arr.set_len(2));

        assert_eq!(arr.to_vec(), vec![Value::from(0), Value::from(1)]);
    }

    #[test]
    fn impossible_growth_leaves_array_untouched() {
        let arr = ArrayRef::from_vec(vec![Value::from(1)]);

        assert!(!arr.set_index(usize::MAX, Value::from(2)));
        assert!(!arr.set_len(usize::MAX));

        assert_eq!(arr.to_vec(), vec![Value::from(1)]);
    }
}
