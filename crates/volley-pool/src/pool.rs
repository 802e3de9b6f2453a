//! Generic recycling pool with lifecycle-driven return.
//!
//! Instances live in a pool-owned arena and are addressed by `InstanceId`
//! (pool id + slot index). Available slots form a stack, so the most
//! recently returned instance is handed out first.
//!
//! Invariant: every instance the pool created is in exactly one of
//! {available, in use}, and the free stack never holds a slot twice.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::tracker::{InstanceId, LifecycleTracker, SubscriptionId};

/// A type that can live in a `RecyclablePool`.
pub trait Recyclable: Clone + 'static {
    /// Restore the state an instance should have while sitting in the pool.
    /// Called on every fresh clone of the prototype and on every return.
    fn reset(&mut self);
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("pool prototype is missing")]
    InvalidPrototype,
    #[error("initial pool size {initial} exceeds the pool limit {limit}")]
    InitialExceedsLimit { initial: usize, limit: usize },
    #[error("instance {0:?} released while already inactive")]
    DoubleRelease(InstanceId),
    #[error("instance {0:?} does not belong to this pool")]
    ForeignInstance(InstanceId),
    #[error("instance {0:?} returned while already available")]
    DuplicateReturn(InstanceId),
}

/// Process-unique pool identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(u32);

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(1);

impl PoolId {
    fn next() -> Self {
        PoolId(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Shared handle to one pooled instance.
///
/// Cloning the handle does not clone the instance. The value is behind a
/// `RefCell`: do not hold a `borrow`/`borrow_mut` guard across a call to
/// `deactivate`, since returning to the pool resets the value.
pub struct Pooled<T> {
    shared: Rc<Shared<T>>,
}

struct Shared<T> {
    value: RefCell<T>,
    tracker: LifecycleTracker,
}

impl<T> Pooled<T> {
    fn new(id: InstanceId, value: T) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: RefCell::new(value),
                tracker: LifecycleTracker::new(id),
            }),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.shared.tracker.instance()
    }

    pub fn is_active(&self) -> bool {
        self.shared.tracker.is_active()
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.shared.value.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.shared.value.borrow_mut()
    }

    pub fn tracker(&self) -> &LifecycleTracker {
        &self.shared.tracker
    }

    /// Take the instance out of service. If a live pool owns it, it is
    /// back in that pool when this returns. Returns false if it was
    /// already inactive.
    pub fn deactivate(&self) -> bool {
        self.shared.tracker.deactivate()
    }

    /// True if both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Pooled<T>) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T> Clone for Pooled<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled")
            .field("id", &self.id())
            .field("active", &self.is_active())
            .field("value", &self.shared.value)
            .finish()
    }
}

struct Slot<T> {
    instance: Pooled<T>,
    subscription: SubscriptionId,
    in_pool: bool,
}

struct PoolState<T> {
    prototype: T,
    slots: Vec<Slot<T>>,
    /// Available slot indices, most recently returned last.
    free: Vec<u32>,
    high_water: usize,
    limit: Option<usize>,
}

impl<T: Recyclable> PoolState<T> {
    fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn can_grow(&self) -> bool {
        self.limit.map_or(true, |limit| self.slots.len() < limit)
    }

    /// Put a deactivated instance back on the free stack.
    fn take_back(&mut self, id: InstanceId) -> Result<(), PoolError> {
        let slot = self
            .slots
            .get_mut(id.slot as usize)
            .ok_or(PoolError::ForeignInstance(id))?;
        if slot.in_pool {
            return Err(PoolError::DuplicateReturn(id));
        }
        slot.instance.borrow_mut().reset();
        slot.in_pool = true;
        self.free.push(id.slot);
        trace!(?id, available = self.free.len(), "instance returned to pool");
        Ok(())
    }
}

/// Pool of reusable `T` instances cloned from a prototype.
///
/// Grows by one instance whenever it is empty, unless created with a
/// limit. Dropping the pool unsubscribes it from every instance's tracker;
/// instances still held elsewhere stay valid and can be deactivated
/// without reaching back into the dropped pool.
pub struct RecyclablePool<T: Recyclable> {
    id: PoolId,
    state: Rc<RefCell<PoolState<T>>>,
}

impl<T: Recyclable> RecyclablePool<T> {
    /// Create an unbounded pool pre-populated with `initial_count` instances.
    pub fn create(prototype: Option<T>, initial_count: usize) -> Result<Self, PoolError> {
        Self::build(prototype, initial_count, None)
    }

    /// Create a pool that never holds more than `limit` instances.
    pub fn create_bounded(
        prototype: Option<T>,
        initial_count: usize,
        limit: usize,
    ) -> Result<Self, PoolError> {
        Self::build(prototype, initial_count, Some(limit))
    }

    fn build(
        prototype: Option<T>,
        initial_count: usize,
        limit: Option<usize>,
    ) -> Result<Self, PoolError> {
        let prototype = prototype.ok_or(PoolError::InvalidPrototype)?;
        if let Some(limit) = limit {
            if initial_count > limit {
                return Err(PoolError::InitialExceedsLimit {
                    initial: initial_count,
                    limit,
                });
            }
        }

        let pool = Self {
            id: PoolId::next(),
            state: Rc::new(RefCell::new(PoolState {
                prototype,
                slots: Vec::with_capacity(initial_count),
                free: Vec::with_capacity(initial_count),
                high_water: 0,
                limit,
            })),
        };
        pool.grow(initial_count);
        debug!(pool = pool.id.0, initial_count, ?limit, "pool created");
        Ok(pool)
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Hand out an available instance, marked active. Creates one first if
    /// none is available. Returns `None` only when a bounded pool is at its
    /// limit with every instance in use.
    pub fn acquire(&self) -> Option<Pooled<T>> {
        let exhausted = self.state.borrow().free.is_empty();
        if exhausted {
            if !self.state.borrow().can_grow() {
                warn!(pool = self.id.0, "pool exhausted at its limit");
                return None;
            }
            self.grow(1);
        }

        let mut state = self.state.borrow_mut();
        let index = state.free.pop()?;
        let slot = &mut state.slots[index as usize];
        slot.in_pool = false;
        let instance = slot.instance.clone();
        instance.tracker().activate();

        let in_use = state.in_use();
        state.high_water = state.high_water.max(in_use);
        Some(instance)
    }

    /// Deactivate an in-use instance, returning it to the pool.
    ///
    /// Releasing an instance that is already inactive is a caller error and
    /// is reported as `DoubleRelease`; the pool is left unchanged.
    pub fn release(&self, instance: &Pooled<T>) -> Result<(), PoolError> {
        if !self.owns(instance) {
            return Err(PoolError::ForeignInstance(instance.id()));
        }
        if !instance.deactivate() {
            return Err(PoolError::DoubleRelease(instance.id()));
        }
        Ok(())
    }

    /// True if `instance` was created by this pool.
    pub fn owns(&self, instance: &Pooled<T>) -> bool {
        let id = instance.id();
        if id.pool != self.id.0 {
            return false;
        }
        self.state
            .borrow()
            .slots
            .get(id.slot as usize)
            .is_some_and(|slot| slot.instance.ptr_eq(instance))
    }

    /// Handles to every instance currently in use, in slot order.
    pub fn active_instances(&self) -> Vec<Pooled<T>> {
        self.state
            .borrow()
            .slots
            .iter()
            .filter(|slot| !slot.in_pool)
            .map(|slot| slot.instance.clone())
            .collect()
    }

    /// Read-only view of the prototype.
    pub fn prototype(&self) -> Ref<'_, T> {
        Ref::map(self.state.borrow(), |state| &state.prototype)
    }

    /// Number of instances ever created.
    pub fn len(&self) -> usize {
        self.state.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Instances waiting in the pool.
    pub fn available(&self) -> usize {
        self.state.borrow().free.len()
    }

    /// Instances handed out and not yet returned.
    pub fn in_use(&self) -> usize {
        self.state.borrow().in_use()
    }

    /// Most instances in use at the same time.
    pub fn high_water(&self) -> usize {
        self.state.borrow().high_water
    }

    pub fn limit(&self) -> Option<usize> {
        self.state.borrow().limit
    }

    fn grow(&self, count: usize) {
        let weak = Rc::downgrade(&self.state);
        let mut state = self.state.borrow_mut();
        for _ in 0..count {
            let slot_index = state.slots.len() as u32;
            let id = InstanceId {
                pool: self.id.0,
                slot: slot_index,
            };
            let mut value = state.prototype.clone();
            value.reset();

            let instance = Pooled::new(id, value);
            let subscription = instance.tracker().subscribe(return_handler(weak.clone()));
            state.slots.push(Slot {
                instance,
                subscription,
                in_pool: true,
            });
            state.free.push(slot_index);
        }
        trace!(pool = self.id.0, count, total = state.slots.len(), "pool grew");
    }
}

impl<T: Recyclable> Drop for RecyclablePool<T> {
    fn drop(&mut self) {
        // Sever every tracker subscription before the state goes away.
        let state = self.state.borrow();
        for slot in &state.slots {
            slot.instance.tracker().unsubscribe(slot.subscription);
        }
        debug!(
            pool = self.id.0,
            instances = state.slots.len(),
            in_use = state.in_use(),
            "pool torn down"
        );
    }
}

impl<T: Recyclable> fmt::Debug for RecyclablePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RecyclablePool")
            .field("id", &self.id)
            .field("created", &state.slots.len())
            .field("available", &state.free.len())
            .field("high_water", &state.high_water)
            .field("limit", &state.limit)
            .finish()
    }
}

/// The pool's tracker subscription: return the instance on deactivation.
fn return_handler<T: Recyclable>(
    pool: Weak<RefCell<PoolState<T>>>,
) -> impl FnMut(InstanceId) + 'static {
    move |id| match pool.upgrade() {
        Some(state) => {
            let result = state.borrow_mut().take_back(id);
            if let Err(err) = result {
                error!(?id, %err, "pool invariant violated");
                debug_assert!(false, "pool invariant violated: {err}");
            }
        }
        None => {
            error!(?id, "lifecycle notification reached a torn-down pool");
            debug_assert!(false, "lifecycle notification reached a torn-down pool");
        }
    }
}
