//! The orchestrator's one inbound dependency: the upstream chain
//! controller's four signal emitters. Expressed as a trait — matching the
//! `ChainTableReader`/`AccountAbiLookup` store-port convention elsewhere in
//! this workspace — so the orchestrator's drain/process loop can be tested
//! against a fake controller instead of a live node.
//!
//! Real subscription semantics: registering a callback returns a
//! [`SubscriptionHandle`] that detaches the callback when released. The
//! orchestrator releases all four in order during shutdown, before the
//! underlying controller may disappear.

use std::sync::Arc;

use shared_types::{BlockStateEvent, IrreversibleBlockEvent, TransactionMetadataEvent, TransactionTraceEvent};

/// A live registration on the controller. Releasing (explicitly, or via
/// `Drop`) detaches the callback; releasing twice is a no-op.
pub struct SubscriptionHandle {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A handle that detaches nothing, for controllers with no unsubscribe
    /// step (e.g. a test double that just drops its callback list).
    pub fn noop() -> Self {
        Self { release: None }
    }

    pub fn release(mut self) {
        if let Some(f) = self.release.take() {
            f();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(f) = self.release.take() {
            f();
        }
    }
}

/// The four signals the orchestrator subscribes to at initialization.
/// Implemented by the host node binary's controller adapter; the
/// controller itself is an external collaborator out of this workspace's
/// scope.
pub trait ControllerSignals: Send + Sync {
    fn subscribe_accepted_block(
        &self,
        callback: Arc<dyn Fn(Arc<BlockStateEvent>) + Send + Sync>,
    ) -> SubscriptionHandle;

    fn subscribe_irreversible_block(
        &self,
        callback: Arc<dyn Fn(Arc<IrreversibleBlockEvent>) + Send + Sync>,
    ) -> SubscriptionHandle;

    fn subscribe_accepted_transaction(
        &self,
        callback: Arc<dyn Fn(Arc<TransactionMetadataEvent>) + Send + Sync>,
    ) -> SubscriptionHandle;

    fn subscribe_applied_transaction_trace(
        &self,
        callback: Arc<dyn Fn(Arc<TransactionTraceEvent>) + Send + Sync>,
    ) -> SubscriptionHandle;
}

/// A controller test double, available to this crate's own unit tests and,
/// behind the `test-util` feature, to other crates' integration tests
/// (this crate's own `tests/` directory included — see its dev-dependency
/// on itself with that feature enabled).
#[cfg(any(test, feature = "test-util"))]
pub mod fakes {
    use super::*;
    use std::sync::Mutex;

    type BlockCb = Arc<dyn Fn(Arc<BlockStateEvent>) + Send + Sync>;
    type TxCb = Arc<dyn Fn(Arc<TransactionMetadataEvent>) + Send + Sync>;
    type TraceCb = Arc<dyn Fn(Arc<TransactionTraceEvent>) + Send + Sync>;

    /// A controller test double that stores the registered callbacks so
    /// tests can fire events synchronously, simulating the producer
    /// thread, and records whether each subscription was released.
    #[derive(Default)]
    pub struct FakeController {
        pub accepted_block: Mutex<Vec<BlockCb>>,
        pub irreversible_block: Mutex<Vec<BlockCb>>,
        pub accepted_transaction: Mutex<Vec<TxCb>>,
        pub applied_transaction_trace: Mutex<Vec<TraceCb>>,
        pub released_count: std::sync::atomic::AtomicUsize,
    }

    impl FakeController {
        pub fn fire_accepted_block(&self, event: Arc<BlockStateEvent>) {
            for cb in self.accepted_block.lock().unwrap().iter() {
                cb(event.clone());
            }
        }

        pub fn fire_irreversible_block(&self, event: Arc<IrreversibleBlockEvent>) {
            for cb in self.irreversible_block.lock().unwrap().iter() {
                cb(event.clone());
            }
        }

        pub fn fire_accepted_transaction(&self, event: Arc<TransactionMetadataEvent>) {
            for cb in self.accepted_transaction.lock().unwrap().iter() {
                cb(event.clone());
            }
        }

        pub fn fire_applied_transaction_trace(&self, event: Arc<TransactionTraceEvent>) {
            for cb in self.applied_transaction_trace.lock().unwrap().iter() {
                cb(event.clone());
            }
        }
    }

    impl ControllerSignals for Arc<FakeController> {
        fn subscribe_accepted_block(&self, callback: BlockCb) -> SubscriptionHandle {
            self.accepted_block.lock().unwrap().push(callback);
            let this = self.clone();
            SubscriptionHandle::new(move || {
                this.released_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            })
        }

        fn subscribe_irreversible_block(&self, callback: BlockCb) -> SubscriptionHandle {
            self.irreversible_block.lock().unwrap().push(callback);
            let this = self.clone();
            SubscriptionHandle::new(move || {
                this.released_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            })
        }

        fn subscribe_accepted_transaction(&self, callback: TxCb) -> SubscriptionHandle {
            self.accepted_transaction.lock().unwrap().push(callback);
            let this = self.clone();
            SubscriptionHandle::new(move || {
                this.released_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            })
        }

        fn subscribe_applied_transaction_trace(&self, callback: TraceCb) -> SubscriptionHandle {
            self.applied_transaction_trace.lock().unwrap().push(callback);
            let this = self.clone();
            SubscriptionHandle::new(move || {
                this.released_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            })
        }
    }
}
