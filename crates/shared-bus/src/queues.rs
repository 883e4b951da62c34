//! Four bounded, single-mutex FIFO queues shared by one producer thread and
//! one consumer thread.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use shared_types::{BlockStateEvent, IrreversibleBlockEvent, TransactionMetadataEvent, TransactionTraceEvent};

use crate::backpressure::AdaptiveSleep;

struct Inner {
    traces: VecDeque<Arc<TransactionTraceEvent>>,
    accepted_transactions: VecDeque<Arc<TransactionMetadataEvent>>,
    accepted_blocks: VecDeque<Arc<BlockStateEvent>>,
    irreversible_blocks: VecDeque<Arc<IrreversibleBlockEvent>>,
    done: bool,
}

impl Inner {
    fn any_over_capacity(&self, max_queue_size: usize) -> bool {
        self.traces.len() > max_queue_size
            || self.accepted_transactions.len() > max_queue_size
            || self.accepted_blocks.len() > max_queue_size
            || self.irreversible_blocks.len() > max_queue_size
    }

    fn all_empty(&self) -> bool {
        self.traces.is_empty()
            && self.accepted_transactions.is_empty()
            && self.accepted_blocks.is_empty()
            && self.irreversible_blocks.is_empty()
    }
}

/// The drained contents of all four queues at a single wakeup, in the fixed
/// processing order the consumer applies: traces, accepted transactions,
/// accepted blocks, irreversible blocks.
#[derive(Default)]
pub struct ProcessingBuffers {
    pub traces: Vec<Arc<TransactionTraceEvent>>,
    pub accepted_transactions: Vec<Arc<TransactionMetadataEvent>>,
    pub accepted_blocks: Vec<Arc<BlockStateEvent>>,
    pub irreversible_blocks: Vec<Arc<IrreversibleBlockEvent>>,
}

impl ProcessingBuffers {
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
            && self.accepted_transactions.is_empty()
            && self.accepted_blocks.is_empty()
            && self.irreversible_blocks.is_empty()
    }
}

/// Shared bounded queues for the four ingestion streams.
///
/// Invariant (ii)/(iii): the consumer never holds `lock` during I/O, and the
/// producer only ever blocks on `lock` and on its own adaptive sleep — never
/// on I/O.
pub struct BoundedStreamQueues {
    lock: Mutex<Inner>,
    condvar: Condvar,
    max_queue_size: usize,
    producer_sleep: AdaptiveSleep,
}

/// Helper macro: the enqueue protocol (spec 4.D) is identical across the
/// four streams modulo which deque it touches.
macro_rules! enqueue_method {
    ($name:ident, $field:ident, $event:ty) => {
        pub fn $name(&self, event: Arc<$event>) {
            loop {
                let mut guard = self.lock.lock().expect("shared-bus mutex poisoned");
                if guard.any_over_capacity(self.max_queue_size) {
                    drop(guard);
                    self.condvar.notify_one();
                    let sleep_for = self.producer_sleep.back_off();
                    thread::sleep(sleep_for);
                    continue;
                }
                self.producer_sleep.decay();
                guard.$field.push_back(event);
                drop(guard);
                self.condvar.notify_one();
                return;
            }
        }
    };
}

impl BoundedStreamQueues {
    pub fn new(max_queue_size: usize) -> Self {
        Self {
            lock: Mutex::new(Inner {
                traces: VecDeque::new(),
                accepted_transactions: VecDeque::new(),
                accepted_blocks: VecDeque::new(),
                irreversible_blocks: VecDeque::new(),
                done: false,
            }),
            condvar: Condvar::new(),
            max_queue_size,
            producer_sleep: AdaptiveSleep::new(),
        }
    }

    enqueue_method!(enqueue_trace, traces, TransactionTraceEvent);
    enqueue_method!(enqueue_accepted_transaction, accepted_transactions, TransactionMetadataEvent);
    enqueue_method!(enqueue_accepted_block, accepted_blocks, BlockStateEvent);
    enqueue_method!(enqueue_irreversible_block, irreversible_blocks, IrreversibleBlockEvent);

    /// The producer thread's current adaptive sleep duration, for metrics.
    pub fn producer_sleep(&self) -> Duration {
        self.producer_sleep.current()
    }

    /// Blocks until at least one queue is non-empty or shutdown has been
    /// requested, then atomically swaps every non-empty queue into a fresh
    /// `ProcessingBuffers` and returns it. Returns `None` only when woken
    /// for shutdown with nothing left to drain.
    pub fn wait_and_drain(&self) -> Option<ProcessingBuffers> {
        let mut guard = self.lock.lock().expect("shared-bus mutex poisoned");
        while guard.all_empty() && !guard.done {
            guard = self.condvar.wait(guard).expect("shared-bus condvar poisoned");
        }
        if guard.all_empty() && guard.done {
            return None;
        }
        let buffers = ProcessingBuffers {
            traces: std::mem::take(&mut guard.traces).into_iter().collect(),
            accepted_transactions: std::mem::take(&mut guard.accepted_transactions).into_iter().collect(),
            accepted_blocks: std::mem::take(&mut guard.accepted_blocks).into_iter().collect(),
            irreversible_blocks: std::mem::take(&mut guard.irreversible_blocks).into_iter().collect(),
        };
        drop(guard);
        Some(buffers)
    }

    /// Requests shutdown and wakes the consumer. The consumer drains
    /// whatever remains before observing `done` on an empty wakeup.
    pub fn shutdown(&self) {
        let mut guard = self.lock.lock().expect("shared-bus mutex poisoned");
        guard.done = true;
        drop(guard);
        self.condvar.notify_all();
    }

    /// Current length of each of the four queues, for the queue-depth
    /// gauge and for tests observing drain progress. Takes the same lock
    /// producers and the consumer use; cheap and uncontended in practice.
    pub fn queue_depths(&self) -> QueueDepths {
        let guard = self.lock.lock().expect("shared-bus mutex poisoned");
        QueueDepths {
            traces: guard.traces.len(),
            accepted_transactions: guard.accepted_transactions.len(),
            accepted_blocks: guard.accepted_blocks.len(),
            irreversible_blocks: guard.irreversible_blocks.len(),
        }
    }
}

/// A snapshot of each queue's length at one instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueDepths {
    pub traces: usize,
    pub accepted_transactions: usize,
    pub accepted_blocks: usize,
    pub irreversible_blocks: usize,
}

impl QueueDepths {
    pub fn total(&self) -> usize {
        self.traces + self.accepted_transactions + self.accepted_blocks + self.irreversible_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{BlockId, BlockPayload, OpaquePayload};
    use std::sync::Arc as StdArc;

    fn sample_block(block_num: u32) -> StdArc<BlockStateEvent> {
        StdArc::new(BlockStateEvent {
            block_num,
            block_id: BlockId(vec![block_num as u8]),
            validated: true,
            in_current_chain: true,
            block_header_state: OpaquePayload(vec![]),
            block: BlockPayload {
                raw: OpaquePayload(vec![]),
                transaction_ids: vec![],
            },
        })
    }

    #[test]
    fn drain_moves_all_queues_and_clears_originals() {
        let queues = BoundedStreamQueues::new(1024);
        queues.enqueue_accepted_block(sample_block(1));
        queues.enqueue_accepted_block(sample_block(2));
        let drained = queues.wait_and_drain().unwrap();
        assert_eq!(drained.accepted_blocks.len(), 2);
        assert_eq!(queues.queue_depths().total(), 0);
    }

    #[test]
    fn fifo_order_is_preserved_within_a_stream() {
        let queues = BoundedStreamQueues::new(1024);
        for n in 0..10 {
            queues.enqueue_accepted_block(sample_block(n));
        }
        let drained = queues.wait_and_drain().unwrap();
        let nums: Vec<u32> = drained.accepted_blocks.iter().map(|b| b.block_num).collect();
        assert_eq!(nums, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn shutdown_with_empty_queues_returns_none() {
        let queues = BoundedStreamQueues::new(1024);
        queues.shutdown();
        assert!(queues.wait_and_drain().is_none());
    }

    #[test]
    fn shutdown_still_drains_pending_events_first() {
        let queues = BoundedStreamQueues::new(1024);
        queues.enqueue_accepted_block(sample_block(1));
        queues.shutdown();
        let drained = queues.wait_and_drain().unwrap();
        assert_eq!(drained.accepted_blocks.len(), 1);
        assert!(queues.wait_and_drain().is_none());
    }

    #[test]
    fn backpressure_eventually_drains_without_dropping_events() {
        let queues = Arc::new(BoundedStreamQueues::new(16));
        let producer_queues = queues.clone();
        let producer = thread::spawn(move || {
            for n in 0..200u32 {
                producer_queues.enqueue_accepted_block(sample_block(n));
            }
        });

        let mut total = 0usize;
        let mut max_seen = 0;
        loop {
            if let Some(buf) = queues.wait_and_drain() {
                max_seen = max_seen.max(total);
                total += buf.accepted_blocks.len();
            }
            if total >= 200 {
                break;
            }
        }
        producer.join().unwrap();
        assert_eq!(total, 200);
        let _ = max_seen;
    }
}
