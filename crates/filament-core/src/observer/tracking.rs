//! The active-subscriber slot.
//!
//! At most one subscriber is "currently evaluating". Reads register that
//! subscriber; nothing has to be passed through the read call sites.
//!
//! The slot is driven by the scheduler with a token discipline:
//! [`begin_evaluation`] swaps the subscriber in and returns a token holding the
//! previous one, [`end_evaluation`] consumes the token and restores it. Tokens
//! must be ended in reverse order of creation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::ports::Subscriber;

thread_local! {
    static ACTIVE: RefCell<Option<Rc<dyn Subscriber>>> = const { RefCell::new(None) };
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Proof of a `begin_evaluation` call. Hand it back to [`end_evaluation`].
#[must_use = "pass the token to `end_evaluation` to restore the previous subscriber"]
pub struct EvaluationToken {
    previous: Option<Rc<dyn Subscriber>>,
    depth: usize,
}

impl std::fmt::Debug for EvaluationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationToken")
            .field("previous", &self.previous.as_ref().map(|s| s.id()))
            .field("depth", &self.depth)
            .finish()
    }
}

/// Make `subscriber` the target of every tracked read until the token ends.
///
/// `None` suspends tracking (reads register nobody).
pub fn begin_evaluation(subscriber: Option<Rc<dyn Subscriber>>) -> EvaluationToken {
    let previous = ACTIVE.with(|slot| slot.replace(subscriber));
    let depth = DEPTH.with(|d| {
        d.set(d.get() + 1);
        d.get()
    });
    EvaluationToken { previous, depth }
}

/// Restore the subscriber that was active before `token` was issued.
pub fn end_evaluation(token: EvaluationToken) {
    let current = DEPTH.with(|d| d.get());
    if current != token.depth {
        tracing::warn!(
            target: "filament::observer",
            expected = token.depth,
            actual = current,
            "evaluation tokens ended out of order"
        );
    }
    DEPTH.with(|d| d.set(token.depth.saturating_sub(1)));
    ACTIVE.with(|slot| *slot.borrow_mut() = token.previous);
}

/// The subscriber currently evaluating, if any.
pub fn active_subscriber() -> Option<Rc<dyn Subscriber>> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

pub fn is_tracking() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

/// Run `f` with no active subscriber.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let token = begin_evaluation(None);
    let result = f();
    end_evaluation(token);
    result
}
