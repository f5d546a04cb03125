//! Bounded delivery queue between the generation and delivery loops.
//!
//! The generation loop enqueues every record bound for the TCP feed; the
//! delivery loop drains the queue whenever a client is connected. The two
//! loops share nothing else. Backpressure is bounded-staleness rather than
//! blocking: a full queue sheds its oldest records so the producer never
//! stalls, and a client that connects late sees the freshest backlog.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use crate::domain::trade::TradeRecord;

/// Default maximum queue depth.
const DEFAULT_MAX_DEPTH: usize = 2000;

/// Bounded FIFO of pending outbound records.
///
/// Shared through an `Arc` by one producer and one consumer. Overflow
/// drops the oldest entries until the newest `max_depth` remain.
#[derive(Debug)]
pub struct FeedQueue {
    records: Mutex<VecDeque<TradeRecord>>,
    max_depth: usize,
    dropped: AtomicU64,
}

impl FeedQueue {
    /// Creates a queue with the default depth bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Creates a queue bounded at `max_depth` records.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(max_depth)),
            max_depth,
            dropped: AtomicU64::new(0),
        }
    }

    /// Appends a record, shedding the oldest entries if the bound is
    /// exceeded. Never blocks the producer.
    pub fn enqueue(&self, record: TradeRecord) {
        let mut records = self.records.lock();
        records.push_back(record);
        let mut shed = 0u64;
        while records.len() > self.max_depth {
            records.pop_front();
            shed += 1;
        }
        drop(records);

        if shed > 0 {
            self.dropped.fetch_add(shed, Ordering::Relaxed);
            trace!(
                shed,
                max_depth = self.max_depth,
                "delivery queue overflow, oldest records dropped"
            );
        }
    }

    /// Pops the oldest record, or `None` when the queue is empty.
    #[must_use]
    pub fn dequeue(&self) -> Option<TradeRecord> {
        self.records.lock().pop_front()
    }

    /// Current queue depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True when no records are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Total records shed to overflow since construction.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for FeedQueue {
    fn default() -> Self {
        Self::new()
    }
}
