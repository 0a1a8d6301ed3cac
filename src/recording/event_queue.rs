// src/recording/event_queue.rs
//! Bounded ingestion buffer
//!
//! Holds captured events until they are drained into a batch. When full, the
//! oldest event is evicted to make room; the new event is never rejected.

use crate::recording::event::RecordedEvent;
use std::collections::VecDeque;

/// FIFO buffer with oldest-first eviction
#[derive(Debug)]
pub struct EventQueue {
    /// Buffered, not yet processed events
    queue: VecDeque<RecordedEvent>,

    capacity: usize,

    /// Push counter
    push_count: u64,

    /// Drain counter
    drain_count: u64,

    /// Eviction counter (buffer full)
    evict_count: u64,
}

impl EventQueue {
    /// Create a new event queue
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            push_count: 0,
            drain_count: 0,
            evict_count: 0,
        }
    }

    /// Push an event, returning the evicted event if the buffer was full
    pub fn push(&mut self, event: RecordedEvent) -> Option<RecordedEvent> {
        let evicted = if self.queue.len() >= self.capacity {
            self.evict_count += 1;
            self.queue.pop_front()
        } else {
            None
        };

        self.queue.push_back(event);
        self.push_count += 1;
        evicted
    }

    /// Remove up to `max` of the oldest events
    pub fn drain_batch(&mut self, max: usize) -> Vec<RecordedEvent> {
        let n = max.min(self.queue.len());
        self.drain_count += n as u64;
        self.queue.drain(..n).collect()
    }

    /// Remove every buffered event
    pub fn drain_all(&mut self) -> Vec<RecordedEvent> {
        let len = self.queue.len();
        self.drain_batch(len)
    }

    /// Change the capacity, evicting the oldest events if now over it
    pub fn set_capacity(&mut self, capacity: usize) -> usize {
        self.capacity = capacity.max(1);
        let mut evicted = 0;
        while self.queue.len() > self.capacity {
            self.queue.pop_front();
            self.evict_count += 1;
            evicted += 1;
        }
        evicted
    }

    /// Snapshot of buffered events, oldest first
    pub fn snapshot(&self) -> Vec<RecordedEvent> {
        self.queue.iter().cloned().collect()
    }

    /// Drop all events and reset counters
    pub fn clear(&mut self) {
        self.queue.clear();
        self.push_count = 0;
        self.drain_count = 0;
        self.evict_count = 0;
    }

    /// Get queue statistics
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            push_count: self.push_count,
            drain_count: self.drain_count,
            evict_count: self.evict_count,
            current_size: self.queue.len(),
            capacity: self.capacity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Queue statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueStats {
    /// Total events pushed
    pub push_count: u64,

    /// Total events handed to batches
    pub drain_count: u64,

    /// Total events evicted (buffer full)
    pub evict_count: u64,

    /// Current queue size
    pub current_size: usize,

    /// Queue capacity
    pub capacity: usize,
}

impl QueueStats {
    /// Calculate fill percentage
    pub fn fill_percentage(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            (self.current_size as f64 / self.capacity as f64) * 100.0
        }
    }

    /// Share of pushed events lost to eviction, in percent
    pub fn eviction_rate(&self) -> f64 {
        if self.push_count == 0 {
            0.0
        } else {
            (self.evict_count as f64 / self.push_count as f64) * 100.0
        }
    }
}
