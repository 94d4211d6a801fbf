//! Buffer for inputs that arrive between ticks.

use std::collections::vec_deque::{self, VecDeque};

/// FIFO of pending inputs, drained at the start of each tick.
#[derive(Debug, Clone)]
pub struct InputQueue<T> {
    pending: VecDeque<T>,
}

impl<T> Default for InputQueue<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }
}

impl<T> InputQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an input for the next tick.
    pub fn push(&mut self, input: T) {
        self.pending.push_back(input);
    }

    /// Take every pending input in arrival order.
    pub fn drain(&mut self) -> vec_deque::Drain<'_, T> {
        self.pending.drain(..)
    }

    /// Discard every pending input.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let mut queue = InputQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_discards_pending() {
        let mut queue = InputQueue::new();
        queue.push("left");
        queue.clear();
        assert_eq!(queue.drain().count(), 0);
    }
}
