#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use filament_core::{Subscriber, SubscriberId, begin_evaluation, end_evaluation};

/// Counts notifications.
pub struct CountingSubscriber {
    id: SubscriberId,
    count: Cell<usize>,
}

impl CountingSubscriber {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: SubscriberId::next(),
            count: Cell::new(0),
        })
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }
}

impl Subscriber for CountingSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn notify(&self) {
        self.count.set(self.count.get() + 1);
    }
}

/// Run `read` with `sub` as the active subscriber.
pub fn read_as<R>(sub: &Rc<CountingSubscriber>, read: impl FnOnce() -> R) -> R {
    let token = begin_evaluation(Some(sub.clone()));
    let result = read();
    end_evaluation(token);
    result
}
