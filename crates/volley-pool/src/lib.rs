//! Object recycling for VOLLEY.
//!
//! A `RecyclablePool` hands out reusable instances and takes them back
//! automatically: every instance carries a `LifecycleTracker`, and the pool
//! subscribes to it when the instance is created. Whoever deactivates an
//! instance (explicit release, an impact, a timeout) returns it to the pool
//! without knowing the pool exists.
//!
//! Single-threaded by construction (`Rc`/`RefCell`); a pool and its
//! instances belong to one owner on one thread.

pub mod pool;
pub mod tracker;

pub use pool::{PoolError, PoolId, Pooled, Recyclable, RecyclablePool};
pub use tracker::{InstanceId, LifecycleTracker, SubscriptionId};
