//! Dashboard history buffer
//!
//! Bounded FIFO of the latest simulate-and-predict payloads. Oldest entries
//! are evicted once capacity is reached.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;

pub struct HistoryBuffer {
    capacity: usize,
    entries: Mutex<VecDeque<Value>>,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, entry: Value) {
        let mut entries = self.entries.lock();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<Value> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
