//! # Shared Bus — Bounded Stream Queues
//!
//! Four FIFO queues (transaction traces, accepted transactions, accepted
//! blocks, irreversible blocks) shared between exactly one producer thread
//! and exactly one consumer thread. All four share a single mutex and
//! condition variable so the consumer can atomically drain whichever queues
//! are non-empty in one wakeup.
//!
//! The producer side never performs I/O and never blocks longer than its own
//! adaptive sleep; the consumer side never holds the lock while doing I/O —
//! it drains into a [`ProcessingBuffers`] and releases the lock before
//! processing anything.

pub mod backpressure;
pub mod queues;

pub use backpressure::AdaptiveSleep;
pub use queues::{BoundedStreamQueues, ProcessingBuffers, QueueDepths};
