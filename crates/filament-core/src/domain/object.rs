//! Objects with ordered own properties and property descriptors.
//!
//! Design:
//! - A property is either a data slot or an accessor pair (`get`/`set` closures).
//! - Reads and writes always go through [`ObjectRef::get`] / [`ObjectRef::set`],
//!   so an accessor installed later (the field interceptor) is picked up by every
//!   caller without the caller knowing.
//! - The attached observer lives in a private slot, not among the properties.
//!   It never shows up in `keys()` and never becomes reactive itself.
//! - No `RefCell` borrow is held while an accessor runs, so accessors may
//!   freely read and write the same object.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::value::Value;
use crate::observer::{Dep, Observer};

/// Accessor read half. Receives the object the property lives on.
pub type Getter = Rc<dyn Fn(&ObjectRef) -> Value>;

/// Accessor write half. Receives the object the property lives on.
pub type Setter = Rc<dyn Fn(&ObjectRef, Value)>;

/// Stand-in for the host's object predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    /// Plain data object. The only class that gets observed.
    Plain,
    /// Opaque framework instance. Never observed, treated as root data.
    Instance,
    /// Virtual node. Never observed.
    VNode,
    /// Any other non-plain object (dates, maps, handles...).
    Foreign,
}

#[derive(Clone)]
pub enum PropertyKind {
    Data { value: Value, writable: bool },
    Accessor {
        get: Option<Getter>,
        set: Option<Setter>,
    },
}

/// Own property descriptor.
#[derive(Clone)]
pub struct Descriptor {
    pub kind: PropertyKind,
    pub enumerable: bool,
    pub configurable: bool,
    /// Set when the accessor is a field interceptor.
    pub(crate) dep: Option<Dep>,
}

impl Descriptor {
    /// Writable, enumerable, configurable data property.
    pub fn data(value: Value) -> Self {
        Self {
            kind: PropertyKind::Data {
                value,
                writable: true,
            },
            enumerable: true,
            configurable: true,
            dep: None,
        }
    }

    /// Enumerable, configurable accessor property.
    pub fn accessor(get: Option<Getter>, set: Option<Setter>) -> Self {
        Self {
            kind: PropertyKind::Accessor { get, set },
            enumerable: true,
            configurable: true,
            dep: None,
        }
    }

    pub fn non_enumerable(mut self) -> Self {
        self.enumerable = false;
        self
    }

    pub fn non_configurable(mut self) -> Self {
        self.configurable = false;
        self
    }

    pub fn getter(&self) -> Option<Getter> {
        match &self.kind {
            PropertyKind::Accessor { get, .. } => get.clone(),
            PropertyKind::Data { .. } => None,
        }
    }

    pub fn setter(&self) -> Option<Setter> {
        match &self.kind {
            PropertyKind::Accessor { set, .. } => set.clone(),
            PropertyKind::Data { .. } => None,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self.kind, PropertyKind::Accessor { .. })
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Descriptor");
        match &self.kind {
            PropertyKind::Data { value, writable } => {
                s.field("value", value).field("writable", writable);
            }
            PropertyKind::Accessor { get, set } => {
                s.field("get", &get.is_some()).field("set", &set.is_some());
            }
        }
        s.field("enumerable", &self.enumerable)
            .field("configurable", &self.configurable)
            .field("reactive", &self.dep.is_some())
            .finish()
    }
}

struct ObjectData {
    class: ObjectClass,
    props: IndexMap<String, Descriptor>,
    extensible: bool,
    observer: Option<Rc<Observer>>,
}

/// Shared handle to an object. Clones alias the same object.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<ObjectData>>);

/// Non-owning handle to an object.
#[derive(Clone)]
pub struct WeakObjectRef(Weak<RefCell<ObjectData>>);

impl WeakObjectRef {
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }
}

impl ObjectRef {
    /// Empty plain object.
    pub fn new() -> Self {
        Self::with_class(ObjectClass::Plain)
    }

    pub fn with_class(class: ObjectClass) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            class,
            props: IndexMap::new(),
            extensible: true,
            observer: None,
        })))
    }

    /// Plain object with data properties in iteration order.
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let obj = Self::new();
        {
            let mut data = obj.0.borrow_mut();
            for (key, value) in entries {
                data.props.insert(key.into(), Descriptor::data(value));
            }
        }
        obj
    }

    pub fn class(&self) -> ObjectClass {
        self.0.borrow().class
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Rc::downgrade(&self.0))
    }

    /// Read a property, running its getter if it has one.
    pub fn get(&self, key: &str) -> Value {
        let kind = self.0.borrow().props.get(key).map(|d| d.kind.clone());
        match kind {
            Some(PropertyKind::Data { value, .. }) => value,
            Some(PropertyKind::Accessor { get: Some(get), .. }) => get(self),
            Some(PropertyKind::Accessor { get: None, .. }) | None => Value::Undefined,
        }
    }

    /// Write a property.
    ///
    /// Runs the setter of an accessor; accessors without a setter and
    /// read-only data properties ignore the write. A missing key is added as a
    /// plain data property unless the object is non-extensible.
    pub fn set(&self, key: &str, value: Value) {
        let setter = {
            let mut data = self.0.borrow_mut();
            let extensible = data.extensible;
            match data.props.get_mut(key) {
                Some(desc) => match &mut desc.kind {
                    PropertyKind::Data {
                        value: slot,
                        writable: true,
                    } => {
                        *slot = value;
                        return;
                    }
                    PropertyKind::Data { .. } => return,
                    PropertyKind::Accessor { set, .. } => set.clone(),
                },
                None => {
                    if extensible {
                        data.props.insert(key.to_string(), Descriptor::data(value));
                    }
                    return;
                }
            }
        };
        if let Some(set) = setter {
            set(self, value);
        }
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.0.borrow().props.contains_key(key)
    }

    /// Enumerable own keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.0
            .borrow()
            .props
            .iter()
            .filter(|(_, desc)| desc.enumerable)
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn own_descriptor(&self, key: &str) -> Option<Descriptor> {
        self.0.borrow().props.get(key).cloned()
    }

    /// Define or redefine an own property.
    ///
    /// Returns `false` if the existing property is non-configurable, or the key
    /// is new and the object is non-extensible.
    pub fn define_property(&self, key: &str, desc: Descriptor) -> bool {
        let mut data = self.0.borrow_mut();
        let extensible = data.extensible;
        match data.props.get_mut(key) {
            Some(existing) if !existing.configurable => false,
            Some(existing) => {
                *existing = desc;
                true
            }
            None if !extensible => false,
            None => {
                data.props.insert(key.to_string(), desc);
                true
            }
        }
    }

    /// Shorthand for an enumerable, configurable accessor property.
    pub fn define_accessor(&self, key: &str, get: Option<Getter>, set: Option<Setter>) -> bool {
        self.define_property(key, Descriptor::accessor(get, set))
    }

    /// Remove an own property. Non-configurable properties stay and `false`
    /// is returned; a missing key counts as deleted.
    pub fn delete(&self, key: &str) -> bool {
        let mut data = self.0.borrow_mut();
        match data.props.get(key).map(|desc| desc.configurable) {
            Some(false) => false,
            Some(true) => {
                data.props.shift_remove(key);
                true
            }
            None => true,
        }
    }

    pub fn prevent_extensions(&self) {
        self.0.borrow_mut().extensible = false;
    }

    pub fn is_extensible(&self) -> bool {
        self.0.borrow().extensible
    }

    /// Non-extensible, every property non-configurable and data properties read-only.
    pub fn freeze(&self) {
        let mut data = self.0.borrow_mut();
        data.extensible = false;
        for desc in data.props.values_mut() {
            desc.configurable = false;
            if let PropertyKind::Data { writable, .. } = &mut desc.kind {
                *writable = false;
            }
        }
    }

    /// Dependency Set of the field interceptor on `key`, if there is one.
    pub fn field_dep(&self, key: &str) -> Option<Dep> {
        self.0.borrow().props.get(key).and_then(|d| d.dep.clone())
    }

    pub(crate) fn observer(&self) -> Option<Rc<Observer>> {
        self.0.borrow().observer.clone()
    }

    pub(crate) fn attach_observer(&self, observer: Rc<Observer>) {
        self.0.borrow_mut().observer = Some(observer);
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: values may point back at this object.
        let data = self.0.borrow();
        f.debug_struct("ObjectRef")
            .field("class", &data.class)
            .field("keys", &data.props.keys().collect::<Vec<_>>())
            .field("observed", &data.observer.is_some())
            .finish()
    }
}
