//! Thread-safe FIFO with blocking and non-blocking pops.
//!
//! This is a classic monitor: a mutex guarding a `VecDeque` plus a condition
//! variable that producers signal after each push. The critical sections are
//! short (one push, one pop, or one length check), so contention stays low
//! even with several producer threads.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

/// An unbounded FIFO of owned values.
///
/// Values move in on [`push`](Self::push) and move out on a pop, so exactly
/// one consumer ends up owning each one. Pushes from a single producer are
/// popped in push order; there is no ordering across producers.
pub struct BlockingQueue<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
}

impl<T> BlockingQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
        }
    }

    /// Appends `item` to the tail and wakes at most one waiter.
    pub fn push(&self, item: T) {
        let mut items = self.items.lock();
        items.push_back(item);
        // Release the lock before notifying so the woken thread doesn't
        // immediately block on it again.
        drop(items);
        self.not_empty.notify_one();
    }

    /// Removes and returns the head, or `None` if the queue is empty.
    /// Never blocks.
    pub fn try_pop(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Blocks until an item is available, then removes and returns it.
    pub fn wait_and_pop(&self) -> T {
        let mut items = self.items.lock();
        loop {
            // Re-check after every wake: the condvar may wake spuriously,
            // or another consumer may have taken the item first.
            if let Some(item) = items.pop_front() {
                return item;
            }
            self.not_empty.wait(&mut items);
        }
    }

    /// Whether the queue was empty at the moment of the call.
    ///
    /// Advisory only: another thread may push or pop right after.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Number of queued items at the moment of the call. Advisory only.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingQueue")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_push_then_pop_is_fifo() {
        let q = BlockingQueue::new();
        for i in 0..10 {
            q.push(i);
        }
        let popped: Vec<i32> = std::iter::from_fn(|| q.try_pop()).collect();
        assert_eq!(popped, (0..10).collect::<Vec<_>>());
        assert!(q.is_empty());
    }

    #[test]
    fn test_try_pop_on_empty_is_idempotent() {
        let q: BlockingQueue<u8> = BlockingQueue::new();
        for _ in 0..5 {
            assert_eq!(q.try_pop(), None);
            assert!(q.is_empty());
            assert_eq!(q.len(), 0);
        }
        // Still usable afterwards.
        q.push(3);
        assert_eq!(q.try_pop(), Some(3));
    }

    #[test]
    fn test_len_tracks_pushes_and_pops() {
        let q = BlockingQueue::new();
        q.push("a");
        q.push("b");
        assert_eq!(q.len(), 2);
        assert!(!q.is_empty());
        q.try_pop();
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_wait_and_pop_returns_immediately_when_item_queued() {
        let q = BlockingQueue::new();
        q.push(7);
        assert_eq!(q.wait_and_pop(), 7);
    }

    #[test]
    fn test_wait_and_pop_blocks_until_push() {
        let q = Arc::new(BlockingQueue::new());
        let consumer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.wait_and_pop())
        };

        // Give the consumer a chance to park on the condvar.
        thread::sleep(Duration::from_millis(20));
        q.push("hello");

        assert_eq!(consumer.join().unwrap(), "hello");
        assert!(q.is_empty());
    }

    #[test]
    fn test_concurrent_producers_lose_nothing() {
        const PRODUCERS: usize = 8;
        const PER_PRODUCER: usize = 500;

        let q = BlockingQueue::new();
        let mut received = Vec::with_capacity(PRODUCERS * PER_PRODUCER);

        thread::scope(|s| {
            for p in 0..PRODUCERS {
                let q = &q;
                s.spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        q.push((p, seq));
                    }
                });
            }
            for _ in 0..PRODUCERS * PER_PRODUCER {
                received.push(q.wait_and_pop());
            }
        });

        assert_eq!(received.len(), PRODUCERS * PER_PRODUCER);
        assert!(q.is_empty());

        // Per-producer order is preserved and nothing is duplicated.
        for p in 0..PRODUCERS {
            let seqs: Vec<usize> = received
                .iter()
                .filter(|(producer, _)| *producer == p)
                .map(|(_, seq)| *seq)
                .collect();
            assert_eq!(seqs, (0..PER_PRODUCER).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_several_waiters_each_get_one_item() {
        let q = Arc::new(BlockingQueue::new());
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let q = Arc::clone(&q);
                thread::spawn(move || q.wait_and_pop())
            })
            .collect();

        for i in 0..4 {
            q.push(i);
        }

        let mut got: Vec<i32> =
            waiters.into_iter().map(|h| h.join().unwrap()).collect();
        got.sort();
        assert_eq!(got, vec![0, 1, 2, 3]);
    }
}
