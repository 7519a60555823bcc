/// Blocking message queue: the only synchronisation primitive workers share.
///
/// An unbounded FIFO guarded by one `parking_lot::Mutex`, with a `Condvar`
/// that receivers park on while the queue is empty. Every push and pop happens
/// under the same lock, and receivers re-check emptiness after each wake-up,
/// so spurious wake-ups and multiple waiters are harmless.
///
/// The queue is unbounded and has no close operation. Shutdown is expressed
/// by sending sentinel items (see [`crate::model::DirTask`]).
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// Thread-safe FIFO with blocking receive.
///
/// Shared by reference between scoped worker threads; no `Arc` needed.
pub struct MsgQueue<T> {
    items: Mutex<VecDeque<T>>,
    ready: Condvar,
}

impl<T> Default for MsgQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MsgQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
        }
    }

    /// Append `item` to the tail and wake one waiting receiver.
    ///
    /// Never blocks beyond acquiring the internal lock.
    pub fn send(&self, item: T) {
        let mut items = self.items.lock();
        items.push_back(item);
        self.ready.notify_one();
    }

    /// Append every item from `batch`, waking one receiver per item.
    pub fn send_many<I>(&self, batch: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut items = self.items.lock();
        for item in batch {
            items.push_back(item);
            self.ready.notify_one();
        }
    }

    /// Remove and return the head item, blocking while the queue is empty.
    pub fn receive(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            self.ready.wait(&mut items);
        }
    }

    /// Remove and return the head item if one is present.
    pub fn try_receive(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Number of queued items at this instant.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// `true` if nothing is queued at this instant.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_fifo_single_producer_single_consumer() {
        let queue = MsgQueue::new();
        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..1_000u32 {
                    queue.send(i);
                }
            });
            let received: Vec<u32> = (0..1_000).map(|_| queue.receive()).collect();
            let expected: Vec<u32> = (0..1_000).collect();
            assert_eq!(received, expected);
        });
        assert!(queue.is_empty());
    }

    #[test]
    fn test_no_loss_or_duplication_many_producers_many_consumers() {
        const PRODUCERS: usize = 8;
        const CONSUMERS: usize = 6;
        const PER_PRODUCER: usize = 2_500;
        const TOTAL: usize = PRODUCERS * PER_PRODUCER;

        let queue: MsgQueue<Option<usize>> = MsgQueue::new();
        let received = AtomicUsize::new(0);

        let seen: Vec<Vec<usize>> = thread::scope(|s| {
            for p in 0..PRODUCERS {
                let queue = &queue;
                s.spawn(move || {
                    for i in 0..PER_PRODUCER {
                        queue.send(Some(p * PER_PRODUCER + i));
                    }
                });
            }

            let consumers: Vec<_> = (0..CONSUMERS)
                .map(|_| {
                    let queue = &queue;
                    let received = &received;
                    s.spawn(move || {
                        let mut got = Vec::new();
                        while let Some(v) = queue.receive() {
                            got.push(v);
                            received.fetch_add(1, Ordering::SeqCst);
                        }
                        got
                    })
                })
                .collect();

            // One stop marker per consumer, once every real item is consumed.
            while received.load(Ordering::SeqCst) < TOTAL {
                thread::yield_now();
            }
            for _ in 0..CONSUMERS {
                queue.send(None);
            }

            consumers.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let all: Vec<usize> = seen.into_iter().flatten().collect();
        assert_eq!(all.len(), TOTAL, "items lost or duplicated");
        let unique: HashSet<usize> = all.iter().copied().collect();
        assert_eq!(unique.len(), TOTAL, "duplicate items received");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_try_receive_on_empty_queue() {
        let queue: MsgQueue<u8> = MsgQueue::new();
        assert_eq!(queue.try_receive(), None);
        queue.send(7);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.try_receive(), Some(7));
        assert_eq!(queue.try_receive(), None);
    }

    #[test]
    fn test_send_many_preserves_order() {
        let queue = MsgQueue::new();
        queue.send_many(["a", "b", "c"]);
        assert_eq!(queue.receive(), "a");
        assert_eq!(queue.receive(), "b");
        assert_eq!(queue.receive(), "c");
    }
}
