// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::error::{Result, SorError};

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A fixed-capacity FIFO queue that blocks producers and consumers.
///
/// [`BoundedQueue::push`] blocks while the queue is full and
/// [`BoundedQueue::pop`] blocks while it is empty, each waiting on its own
/// condition variable with the predicate re-checked after every wakeup.
/// [`BoundedQueue::close`] ends the conversation: blocked producers and
/// consumers wake, further pushes are rejected, and pops drain whatever is
/// still queued before reporting `None`. Consumers can therefore loop on
/// `while let Some(item) = queue.pop()`.
pub struct BoundedQueue<T> {
    capacity: usize,
    state: Mutex<QueueState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items.
    ///
    /// # Errors
    /// Returns an error if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SorError::InvalidQueueCapacity);
        }
        Ok(BoundedQueue {
            capacity,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    /// Maximum number of queued items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().items.is_empty()
    }

    /// Append an item, blocking while the queue is full.
    ///
    /// # Errors
    /// Returns an error if the queue has been closed; the item is dropped.
    pub fn push(&self, item: T) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        while state.items.len() == self.capacity && !state.closed {
            state = self.not_full.wait(state).unwrap();
        }
        if state.closed {
            return Err(SorError::QueueClosed);
        }
        state.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove the oldest item, blocking while the queue is empty.
    ///
    /// Returns `None` only once the queue is closed and fully drained.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        while state.items.is_empty() && !state.closed {
            state = self.not_empty.wait(state).unwrap();
        }
        match state.items.pop_front() {
            Some(item) => {
                self.not_full.notify_one();
                Some(item)
            }
            None => None,
        }
    }

    /// Close the queue, waking every blocked producer and consumer.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}
