//! Dependency Set: the subscribers interested in one field or one shape.
//!
//! Design:
//! - Subscribers are held weakly; the scheduler owns them.
//! - Registration order is preserved and is the delivery order of `notify`.
//! - A subscriber appears at most once per Dep (keyed by `SubscriberId`).

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::tracking;
use crate::domain::{DepId, SubscriberId};
use crate::ports::Subscriber;

struct DepInner {
    id: DepId,
    subs: RefCell<Vec<(SubscriberId, Weak<dyn Subscriber>)>>,
}

/// Shared handle to one Dependency Set.
#[derive(Clone)]
pub struct Dep {
    inner: Rc<DepInner>,
}

impl Dep {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(DepInner {
                id: DepId::next(),
                subs: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> DepId {
        self.inner.id
    }

    /// Add `sub` unless it is already present.
    pub fn add(&self, sub: &Rc<dyn Subscriber>) {
        let id = sub.id();
        let mut subs = self.inner.subs.borrow_mut();
        if subs.iter().any(|(existing, _)| *existing == id) {
            return;
        }
        subs.push((id, Rc::downgrade(sub)));
    }

    pub fn remove(&self, id: SubscriberId) {
        self.inner
            .subs
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }

    /// Register the active subscriber, if any.
    pub fn depend(&self) {
        if let Some(active) = tracking::active_subscriber() {
            self.add(&active);
            active.track(self);
        }
    }

    /// Signal every subscriber, in registration order.
    ///
    /// Delivery works on a snapshot: subscribers added while notifying are
    /// not signalled in this pass. Dropped subscribers are pruned.
    pub fn notify(&self) {
        let snapshot: Vec<Weak<dyn Subscriber>> = self
            .inner
            .subs
            .borrow()
            .iter()
            .map(|(_, sub)| sub.clone())
            .collect();
        tracing::trace!(dep = %self.id(), subscribers = snapshot.len(), "notify");

        let mut saw_dead = false;
        for sub in snapshot {
            match sub.upgrade() {
                Some(sub) => sub.notify(),
                None => saw_dead = true,
            }
        }
        if saw_dead {
            self.inner
                .subs
                .borrow_mut()
                .retain(|(_, sub)| sub.strong_count() > 0);
        }
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.inner.subs.borrow().iter().any(|(existing, _)| *existing == id)
    }

    pub fn subscriber_ids(&self) -> Vec<SubscriberId> {
        self.inner.subs.borrow().iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.subs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ptr_eq(&self, other: &Dep) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Dep {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.id())
            .field("subscribers", &self.subscriber_ids())
            .finish()
    }
}
