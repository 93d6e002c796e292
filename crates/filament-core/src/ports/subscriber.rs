//! Subscriber port - 再計算の主体
//!
//! The engine never owns a subscriber: Dependency Sets hold weak handles and
//! the scheduler decides when a subscriber lives, runs and dies.

use crate::domain::SubscriberId;
use crate::observer::Dep;

/// A computation that can be made active and later receive change signals.
///
/// # 使用例
/// ```ignore
/// struct Render { id: SubscriberId, dirty: Cell<bool> }
///
/// impl Subscriber for Render {
///     fn id(&self) -> SubscriberId { self.id }
///     fn notify(&self) { self.dirty.set(true) }
/// }
/// ```
pub trait Subscriber {
    /// Stable identity used for deduplication inside one Dependency Set.
    fn id(&self) -> SubscriberId;

    /// A field or shape this subscriber read has changed.
    ///
    /// Delivered synchronously. Writing reactive fields from here is allowed
    /// and recurses.
    fn notify(&self);

    /// Called after this subscriber was registered on `dep` during a read.
    ///
    /// Lets a watcher keep its own list of dependencies; nothing by default.
    fn track(&self, _dep: &Dep) {}
}
