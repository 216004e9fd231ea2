//! Fixed-capacity ring buffer for one event kind.
//!
//! An [`EventQueue`] allocates its slots once and never grows. One slot is
//! kept free to tell "full" from "empty", so a queue built with capacity `N`
//! holds at most `N - 1` events.
//!
//! Overflow is lossy: a push into a full queue is discarded and counted, not
//! reported as an error.

use std::fmt;

/// Ring size used when no capacity is configured.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A circular FIFO of `Copy` event values.
pub struct EventQueue<E> {
    slots: Box<[E]>,
    /// Next write position.
    head: usize,
    /// Next read position.
    tail: usize,
    /// Pushes discarded because the ring was full.
    dropped: u64,
}

impl<E: Copy + Default> EventQueue<E> {
    /// Create a queue with [`DEFAULT_EVENT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create a queue with `capacity` slots (`capacity - 1` usable).
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity >= 2,
            "event queue capacity must be at least 2, got {capacity}"
        );
        Self {
            slots: vec![E::default(); capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            dropped: 0,
        }
    }
}

impl<E: Copy> EventQueue<E> {
    #[inline]
    fn advance(&self, cursor: usize) -> usize {
        (cursor + 1) % self.slots.len()
    }

    /// Append an event.
    ///
    /// Returns `false` if the queue was full and the event was dropped.
    pub fn push(&mut self, event: E) -> bool {
        let next = self.advance(self.head);
        if next == self.tail {
            self.dropped += 1;
            return false;
        }
        self.slots[self.head] = event;
        self.head = next;
        true
    }

    /// Remove and return the oldest event.
    pub fn try_pop(&mut self) -> Option<E> {
        if self.tail == self.head {
            return None;
        }
        let event = self.slots[self.tail];
        self.tail = self.advance(self.tail);
        Some(event)
    }

    /// Discard every pending event. Returns how many were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.len();
        self.tail = self.head;
        discarded
    }

    /// Pending events, oldest first, without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = E> + '_ {
        let cap = self.slots.len();
        (0..self.len()).map(move |offset| self.slots[(self.tail + offset) % cap])
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        (self.head + self.slots.len() - self.tail) % self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// `true` when the next push would be dropped.
    pub fn is_full(&self) -> bool {
        self.advance(self.head) == self.tail
    }

    /// Number of slots, including the one kept free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Total pushes dropped since creation or the last [`take_dropped`](Self::take_dropped).
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Return the drop counter and reset it to zero.
    pub fn take_dropped(&mut self) -> u64 {
        std::mem::take(&mut self.dropped)
    }
}

impl<E: Copy + Default> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventQueue<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("capacity", &self.slots.len())
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("dropped", &self.dropped)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut q = EventQueue::<u32>::with_capacity(8);
        for i in 0..5 {
            assert!(q.push(i));
        }
        assert_eq!(q.len(), 5);
        let popped: Vec<_> = std::iter::from_fn(|| q.try_pop()).collect();
        assert_eq!(popped, vec![0, 1, 2, 3, 4]);
        assert!(q.is_empty());
    }

    #[test]
    fn overflow_drops_silently_and_keeps_capacity_minus_one() {
        let mut q = EventQueue::<u32>::new();
        let cap = q.capacity();
        for i in 0..=cap as u32 {
            q.push(i);
        }
        assert!(q.is_full());
        assert_eq!(q.len(), cap - 1);
        assert_eq!(q.dropped(), 2);

        let mut count = 0;
        while let Some(event) = q.try_pop() {
            assert_eq!(event, count);
            count += 1;
        }
        assert_eq!(count as usize, cap - 1);
    }

    #[test]
    fn wraps_around() {
        let mut q = EventQueue::<u8>::with_capacity(4);
        for round in 0..10u8 {
            assert!(q.push(round));
            assert!(q.push(round + 100));
            assert_eq!(q.try_pop(), Some(round));
            assert_eq!(q.try_pop(), Some(round + 100));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn clear_discards_pending() {
        let mut q = EventQueue::<i32>::with_capacity(16);
        q.push(1);
        q.push(2);
        q.push(3);
        q.try_pop();
        assert_eq!(q.clear(), 2);
        assert_eq!(q.try_pop(), None);
        assert!(q.push(4));
        assert_eq!(q.try_pop(), Some(4));
    }

    #[test]
    fn iter_does_not_consume() {
        let mut q = EventQueue::<i32>::with_capacity(4);
        q.push(7);
        q.try_pop();
        q.push(8);
        q.push(9);
        q.push(10);
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![8, 9, 10]);
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn take_dropped_resets_counter() {
        let mut q = EventQueue::<i32>::with_capacity(2);
        assert!(q.push(1));
        assert!(!q.push(2));
        assert_eq!(q.take_dropped(), 1);
        assert_eq!(q.dropped(), 0);
    }

    #[test]
    #[should_panic(expected = "at least 2")]
    fn tiny_capacity_panics() {
        let _ = EventQueue::<i32>::with_capacity(1);
    }
}
