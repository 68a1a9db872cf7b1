//! Bounded rolling store of latency samples
//!
//! One writer (the probing task) pushes samples while any number of readers
//! take snapshots. The lock is held only for a push, a capacity change or a
//! snapshot copy, never across an await point.

use crate::defaults::INITIAL_CAPACITY;
use crate::models::Sample;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
struct Inner {
    samples: VecDeque<Sample>,
    capacity: usize,
    generation: u64,
}

impl Inner {
    fn evict_excess(&mut self) {
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }
}

/// Cloneable handle to a shared FIFO of samples.
///
/// Invariant: `len() <= capacity()` after every operation.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    inner: Arc<Mutex<Inner>>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                samples: VecDeque::with_capacity(capacity),
                capacity,
                generation: 0,
            })),
        }
    }

    // A panic while holding the lock cannot leave the deque half-updated,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a sample, evicting the oldest ones beyond capacity
    pub fn push(&self, sample: Sample) {
        let mut inner = self.lock();
        inner.samples.push_back(sample);
        inner.evict_excess();
        inner.generation = inner.generation.wrapping_add(1);
    }

    /// Independent copy of the current window, oldest first
    pub fn snapshot(&self) -> Vec<Sample> {
        let inner = self.lock();
        inner.samples.iter().copied().collect()
    }

    /// Snapshot together with the generation it was taken at
    pub fn snapshot_with_generation(&self) -> (Vec<Sample>, u64) {
        let inner = self.lock();
        (inner.samples.iter().copied().collect(), inner.generation)
    }

    /// Change the capacity; shrinking drops the oldest samples immediately
    pub fn set_capacity(&self, capacity: usize) {
        let mut inner = self.lock();
        inner.capacity = capacity;
        inner.evict_excess();
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.samples.clear();
        inner.generation = inner.generation.wrapping_add(1);
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    pub fn len(&self) -> usize {
        self.lock().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().samples.is_empty()
    }

    /// Most recently pushed sample
    pub fn latest(&self) -> Option<Sample> {
        self.lock().samples.back().copied()
    }

    /// Change counter, bumped by every push and clear
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}
