//! Dead-letter queue for invocations that ended in an error.
//!
//! Entries are kept for inspection only. Nothing is retried from here.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::SystemTime;

use crate::observability::metrics;
use crate::probe::TargetDescriptor;

/// One failed invocation.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub target: TargetDescriptor,
    pub error: String,
    pub failed_at: SystemTime,
}

impl DeadLetter {
    pub fn new(target: TargetDescriptor, error: &dyn std::error::Error) -> Self {
        Self {
            target,
            error: error.to_string(),
            failed_at: SystemTime::now(),
        }
    }
}

/// Bounded FIFO; the oldest entry is evicted when full.
#[derive(Debug)]
pub struct DeadLetterQueue {
    capacity: usize,
    entries: Mutex<VecDeque<DeadLetter>>,
}

impl DeadLetterQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
        }
    }

    pub fn push(&self, letter: DeadLetter) {
        tracing::warn!(
            target_name = %letter.target.name(),
            environment = %letter.target.environment(),
            error = %letter.error,
            "Invocation dead-lettered"
        );
        metrics::record_dead_letter(letter.target.name());

        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(letter);
    }

    /// Copy of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<DeadLetter> {
        match self.entries.lock() {
            Ok(guard) => guard.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(name: &str) -> DeadLetter {
        let target = TargetDescriptor::new(name, "https://example.com", "devo").unwrap();
        let error = std::io::Error::new(std::io::ErrorKind::Other, "backend down");
        DeadLetter::new(target, &error)
    }

    #[test]
    fn test_push_and_snapshot() {
        let queue = DeadLetterQueue::new(10);
        assert!(queue.is_empty());

        queue.push(letter("kraken"));
        let entries = queue.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target.name(), "kraken");
        assert_eq!(entries[0].error, "backend down");
    }

    #[test]
    fn test_oldest_evicted_at_capacity() {
        let queue = DeadLetterQueue::new(2);
        queue.push(letter("coinbase"));
        queue.push(letter("kraken"));
        queue.push(letter("gemini"));

        let names: Vec<String> = queue
            .snapshot()
            .iter()
            .map(|d| d.target.name().to_string())
            .collect();
        assert_eq!(names, vec!["kraken", "gemini"]);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(DeadLetterQueue::new(0).capacity(), 1);
    }
}
