use std::collections::VecDeque;
use std::fmt;

/// Fixed-capacity queue, newest item at the front. Pushing into a full queue
/// evicts the oldest item.
pub struct CircularQueue<T> {
    deque: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> Clone for CircularQueue<T> {
    fn clone(&self) -> Self {
        Self {
            deque: self.deque.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for CircularQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.deque.fmt(f)
    }
}

impl<T> CircularQueue<T> {
    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            deque: VecDeque::with_capacity(cap),
            capacity: cap,
        }
    }

    #[inline]
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }

        let poped = if self.is_full() {
            self.deque.pop_back()
        } else {
            None
        };

        self.deque.push_front(item);

        poped
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.deque.len() == self.capacity
    }

    #[inline]
    pub fn top(&self) -> Option<&T> {
        self.deque.front()
    }

    /// Oldest first.
    #[inline]
    pub fn asc_iter(&self) -> impl Iterator<Item = &'_ T> {
        self.deque.iter().rev()
    }
}

impl<T: Copy> CircularQueue<T> {
    /// `(previous, current)` pair of the two most recent items.
    #[inline]
    pub fn latest_two(&self) -> Option<(T, T)> {
        let mut iter = self.deque.iter();
        let curr = iter.next()?;
        let prev = iter.next()?;

        Some((*prev, *curr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let mut q = CircularQueue::with_capacity(2);
        assert_eq!(q.push(1), None);
        assert_eq!(q.push(2), None);
        assert!(q.is_full());
        assert_eq!(q.push(3), Some(1));

        assert!(q.is_full());
        assert_eq!(q.asc_iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(q.top(), Some(&3));
    }

    #[test]
    fn latest_two_needs_two_items() {
        let mut q = CircularQueue::with_capacity(2);
        assert_eq!(q.latest_two(), None);
        q.push(10);
        assert_eq!(q.latest_two(), None);
        q.push(20);
        assert_eq!(q.latest_two(), Some((10, 20)));
        q.push(30);
        assert_eq!(q.latest_two(), Some((20, 30)));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut q = CircularQueue::with_capacity(0);
        assert_eq!(q.push(1), Some(1));
        assert_eq!(q.push(2), Some(2));
        assert_eq!(q.top(), None);
        assert_eq!(q.asc_iter().count(), 0);
    }
}
