//! [`ControllerSignals`] against the host chain controller.
//!
//! The controller itself — the process that actually decodes p2p blocks and
//! fires these four callbacks — is an external collaborator out of this
//! workspace's scope. This bridge is the concrete injection point: whatever
//! embeds this plugin constructs a [`ControllerBridge`] and calls its
//! `dispatch_*` methods from the controller's own signal-emitting thread —
//! the one producer thread the rest of this workspace assumes.

use std::sync::{Arc, Mutex};

use indexer_pipeline::{ControllerSignals, SubscriptionHandle};
use shared_types::{BlockStateEvent, IrreversibleBlockEvent, TransactionMetadataEvent, TransactionTraceEvent};

type BlockCb = Arc<dyn Fn(Arc<BlockStateEvent>) + Send + Sync>;
type IrreversibleCb = Arc<dyn Fn(Arc<IrreversibleBlockEvent>) + Send + Sync>;
type TxCb = Arc<dyn Fn(Arc<TransactionMetadataEvent>) + Send + Sync>;
type TraceCb = Arc<dyn Fn(Arc<TransactionTraceEvent>) + Send + Sync>;

/// The real `ControllerSignals` implementation: a plain callback registry,
/// called into from the controller's own thread via the `dispatch_*`
/// methods below.
/// Each registry slot is `None` once its subscription has been released,
/// so the slot's index stays stable and can be cleared again (a no-op)
/// without disturbing the other callbacks.
#[derive(Default)]
pub struct ControllerBridge {
    accepted_block: Mutex<Vec<Option<BlockCb>>>,
    irreversible_block: Mutex<Vec<Option<IrreversibleCb>>>,
    accepted_transaction: Mutex<Vec<Option<TxCb>>>,
    applied_transaction_trace: Mutex<Vec<Option<TraceCb>>>,
}

impl ControllerBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn dispatch_accepted_block(&self, event: Arc<BlockStateEvent>) {
        for cb in self.accepted_block.lock().unwrap().iter().flatten() {
            cb(event.clone());
        }
    }

    pub fn dispatch_irreversible_block(&self, event: Arc<IrreversibleBlockEvent>) {
        for cb in self.irreversible_block.lock().unwrap().iter().flatten() {
            cb(event.clone());
        }
    }

    pub fn dispatch_accepted_transaction(&self, event: Arc<TransactionMetadataEvent>) {
        for cb in self.accepted_transaction.lock().unwrap().iter().flatten() {
            cb(event.clone());
        }
    }

    pub fn dispatch_applied_transaction_trace(&self, event: Arc<TransactionTraceEvent>) {
        for cb in self.applied_transaction_trace.lock().unwrap().iter().flatten() {
            cb(event.clone());
        }
    }
}

impl ControllerSignals for Arc<ControllerBridge> {
    fn subscribe_accepted_block(&self, callback: BlockCb) -> SubscriptionHandle {
        let mut slots = self.accepted_block.lock().unwrap();
        slots.push(Some(callback));
        let index = slots.len() - 1;
        let this = self.clone();
        SubscriptionHandle::new(move || {
            if let Some(slot) = this.accepted_block.lock().unwrap().get_mut(index) {
                *slot = None;
            }
        })
    }

    fn subscribe_irreversible_block(&self, callback: IrreversibleCb) -> SubscriptionHandle {
        let mut slots = self.irreversible_block.lock().unwrap();
        slots.push(Some(callback));
        let index = slots.len() - 1;
        let this = self.clone();
        SubscriptionHandle::new(move || {
            if let Some(slot) = this.irreversible_block.lock().unwrap().get_mut(index) {
                *slot = None;
            }
        })
    }

    fn subscribe_accepted_transaction(&self, callback: TxCb) -> SubscriptionHandle {
        let mut slots = self.accepted_transaction.lock().unwrap();
        slots.push(Some(callback));
        let index = slots.len() - 1;
        let this = self.clone();
        SubscriptionHandle::new(move || {
            if let Some(slot) = this.accepted_transaction.lock().unwrap().get_mut(index) {
                *slot = None;
            }
        })
    }

    fn subscribe_applied_transaction_trace(&self, callback: TraceCb) -> SubscriptionHandle {
        let mut slots = self.applied_transaction_trace.lock().unwrap();
        slots.push(Some(callback));
        let index = slots.len() - 1;
        let this = self.clone();
        SubscriptionHandle::new(move || {
            if let Some(slot) = this.applied_transaction_trace.lock().unwrap().get_mut(index) {
                *slot = None;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{BlockId, BlockPayload, OpaquePayload};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn dispatch_reaches_every_registered_callback() {
        let bridge = ControllerBridge::new();
        let seen = Arc::new(AtomicU32::new(0));
        let s = seen.clone();
        ControllerSignals::subscribe_accepted_block(
            &bridge,
            Arc::new(move |event: Arc<BlockStateEvent>| {
                s.fetch_add(event.block_num, Ordering::Relaxed);
            }),
        );

        bridge.dispatch_accepted_block(Arc::new(BlockStateEvent {
            block_num: 7,
            block_id: BlockId(vec![1]),
            validated: true,
            in_current_chain: true,
            block_header_state: OpaquePayload(vec![]),
            block: BlockPayload {
                raw: OpaquePayload(vec![]),
                transaction_ids: vec![],
            },
        }));

        assert_eq!(seen.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn releasing_a_handle_detaches_its_callback() {
        let bridge = ControllerBridge::new();
        let seen = Arc::new(AtomicU32::new(0));
        let s = seen.clone();
        let handle = ControllerSignals::subscribe_accepted_block(
            &bridge,
            Arc::new(move |event: Arc<BlockStateEvent>| {
                s.fetch_add(event.block_num, Ordering::Relaxed);
            }),
        );
        handle.release();

        bridge.dispatch_accepted_block(Arc::new(BlockStateEvent {
            block_num: 7,
            block_id: BlockId(vec![1]),
            validated: true,
            in_current_chain: true,
            block_header_state: OpaquePayload(vec![]),
            block: BlockPayload {
                raw: OpaquePayload(vec![]),
                transaction_ids: vec![],
            },
        }));

        assert_eq!(seen.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn releasing_one_handle_leaves_other_subscriptions_intact() {
        let bridge = ControllerBridge::new();
        let first_seen = Arc::new(AtomicU32::new(0));
        let second_seen = Arc::new(AtomicU32::new(0));

        let fs = first_seen.clone();
        let first_handle = ControllerSignals::subscribe_accepted_block(
            &bridge,
            Arc::new(move |event: Arc<BlockStateEvent>| {
                fs.fetch_add(event.block_num, Ordering::Relaxed);
            }),
        );
        let ss = second_seen.clone();
        ControllerSignals::subscribe_accepted_block(
            &bridge,
            Arc::new(move |event: Arc<BlockStateEvent>| {
                ss.fetch_add(event.block_num, Ordering::Relaxed);
            }),
        );
        first_handle.release();

        bridge.dispatch_accepted_block(Arc::new(BlockStateEvent {
            block_num: 7,
            block_id: BlockId(vec![1]),
            validated: true,
            in_current_chain: true,
            block_header_state: OpaquePayload(vec![]),
            block: BlockPayload {
                raw: OpaquePayload(vec![]),
                transaction_ids: vec![],
            },
        }));

        assert_eq!(first_seen.load(Ordering::Relaxed), 0);
        assert_eq!(second_seen.load(Ordering::Relaxed), 7);
    }
}
