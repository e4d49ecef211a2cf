//! Fixed-capacity FIFO buffer.

use std::collections::VecDeque;

/// Keeps the most recent `capacity` items, evicting the oldest on overflow.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one item, evicting from the front until there is room.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// The newest `n` items, oldest of those first.
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_below_capacity_keeps_everything() {
        let mut ring = RingBuffer::new(3);
        ring.push(1);
        ring.push(2);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let mut ring = RingBuffer::new(3);
        for i in 1..=5 {
            ring.push(i);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn last_n_returns_newest_in_order() {
        let mut ring = RingBuffer::new(10);
        for i in 1..=6 {
            ring.push(i);
        }
        assert_eq!(ring.last_n(3).copied().collect::<Vec<_>>(), vec![4, 5, 6]);
    }

    #[test]
    fn last_n_larger_than_len_returns_all() {
        let mut ring = RingBuffer::new(10);
        ring.push(7);
        assert_eq!(ring.last_n(5).copied().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn zero_capacity_stays_empty() {
        let mut ring: RingBuffer<u32> = RingBuffer::new(0);
        ring.push(1);
        assert!(ring.is_empty());
    }
}
