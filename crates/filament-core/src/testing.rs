//! Test doubles shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::domain::{DepId, SubscriberId};
use crate::observer::Dep;
use crate::ports::Subscriber;

/// Counts notifications and remembers which Deps it was tracked on.
pub struct CountingSubscriber {
    id: SubscriberId,
    name: &'static str,
    count: Cell<usize>,
    tracked: RefCell<Vec<DepId>>,
    log: Option<Rc<RefCell<Vec<&'static str>>>>,
}

impl CountingSubscriber {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: SubscriberId::next(),
            name: "sub",
            count: Cell::new(0),
            tracked: RefCell::new(Vec::new()),
            log: None,
        })
    }

    /// Also appends `name` to `log` on every notification.
    pub fn with_log(name: &'static str, log: Rc<RefCell<Vec<&'static str>>>) -> Rc<Self> {
        Rc::new(Self {
            id: SubscriberId::next(),
            name,
            count: Cell::new(0),
            tracked: RefCell::new(Vec::new()),
            log: Some(log),
        })
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }

    pub fn tracked(&self) -> Vec<DepId> {
        self.tracked.borrow().clone()
    }
}

impl Subscriber for CountingSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn notify(&self) {
        self.count.set(self.count.get() + 1);
        if let Some(log) = &self.log {
            log.borrow_mut().push(self.name);
        }
    }

    fn track(&self, dep: &Dep) {
        self.tracked.borrow_mut().push(dep.id());
    }
}

/// Run `read` with `sub` as the active subscriber.
pub fn read_as<R>(sub: &Rc<CountingSubscriber>, read: impl FnOnce() -> R) -> R {
    let token = crate::observer::begin_evaluation(Some(sub.clone()));
    let result = read();
    crate::observer::end_evaluation(token);
    result
}
