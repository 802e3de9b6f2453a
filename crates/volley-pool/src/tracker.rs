//! Lifecycle tracking for pooled instances.
//!
//! A tracker owns the instance's active flag. Each active -> inactive
//! transition notifies every subscriber exactly once, synchronously, in
//! subscription order. Activation is silent.

use std::cell::{Cell, RefCell};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of a pooled instance: owning pool plus arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId {
    pub pool: u32,
    pub slot: u32,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(InstanceId)>;

/// Observer hub for one instance's "became inactive" transition.
pub struct LifecycleTracker {
    instance: InstanceId,
    active: Cell<bool>,
    handlers: RefCell<Vec<(SubscriptionId, Handler)>>,
    next_subscription: Cell<u64>,
    /// Set while handlers run; they are moved out of `handlers` meanwhile.
    dispatching: Cell<bool>,
    /// Unsubscribe requests that arrived during dispatch.
    pending_removals: RefCell<Vec<SubscriptionId>>,
    notifications: Cell<u64>,
}

impl LifecycleTracker {
    /// New tracker, initially inactive, with no subscribers.
    pub fn new(instance: InstanceId) -> Self {
        Self {
            instance,
            active: Cell::new(false),
            handlers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
            dispatching: Cell::new(false),
            pending_removals: RefCell::new(Vec::new()),
            notifications: Cell::new(0),
        }
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Number of active -> inactive transitions observed so far.
    pub fn notifications(&self) -> u64 {
        self.notifications.get()
    }

    pub fn subscriber_count(&self) -> usize {
        let pending = self.pending_removals.borrow().len();
        self.handlers.borrow().len().saturating_sub(pending)
    }

    /// Register a handler for the "became inactive" notification.
    pub fn subscribe(&self, handler: impl FnMut(InstanceId) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        if self.dispatching.get() {
            self.pending_removals.borrow_mut().push(id);
            return true;
        }
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    /// Mark active. Returns false if it already was.
    pub fn activate(&self) -> bool {
        !self.active.replace(true)
    }

    /// Mark inactive and notify subscribers. Returns false, and notifies
    /// nobody, if the instance was already inactive.
    pub fn deactivate(&self) -> bool {
        if !self.active.replace(false) {
            return false;
        }
        self.notifications.set(self.notifications.get() + 1);
        self.dispatch();
        true
    }

    fn dispatch(&self) {
        // Handlers are moved out so they may subscribe or unsubscribe
        // on this tracker while running.
        let mut running = self.handlers.take();
        self.dispatching.set(true);
        for (_, handler) in running.iter_mut() {
            handler(self.instance);
        }
        self.dispatching.set(false);

        let added = self.handlers.take();
        running.extend(added);
        let removed = self.pending_removals.take();
        if !removed.is_empty() {
            running.retain(|(sub, _)| !removed.contains(sub));
        }
        *self.handlers.borrow_mut() = running;
    }
}

impl fmt::Debug for LifecycleTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleTracker")
            .field("instance", &self.instance)
            .field("active", &self.active.get())
            .field("subscribers", &self.subscriber_count())
            .field("notifications", &self.notifications.get())
            .finish()
    }
}
