/*
 * Lock-Free Edge Event Queue
 *
 * Fixed-capacity ring buffer carrying edge events from the GPIO
 * interrupt handler (producer) to the task that reads the device
 * (consumer).
 *
 * Design:
 * - `C` slots stored inline, no heap
 * - Atomic head (producer) and tail (consumer) cursors
 * - Cursors only ever grow (wrapping), slot = cursor % C
 * - Single producer; readers take the consumer lock
 * - Drop newest on overflow (never overwrites unread events)
 *
 * Thread Safety:
 * - Producer path: atomic loads and stores only, no read-modify-write,
 *   no locks. Safe to push from interrupt context.
 * - head: Release store by producer, Acquire load by consumer
 * - tail: Release store by consumer, Acquire load by producer
 * - try_pop and clear hold `consumer` for the whole operation, so two
 *   tasks reading the same device never race on tail
 */

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

use super::event::{EdgeEvent, Level};

/// Default number of slots in each per-pin queue
pub const DEFAULT_EVQ_CAPACITY: usize = 32;

/// Single-producer single-consumer queue of edge events
///
/// `C` must be a non-zero power of two so that `cursor % C` stays
/// continuous when the cursors wrap around `usize::MAX`.
pub struct EventQueue<const C: usize> {
    /// Event storage, indexed by cursor modulo capacity
    slots: [UnsafeCell<EdgeEvent>; C],

    /// Next slot to write (producer cursor)
    head: AtomicUsize,

    /// Next slot to read (consumer cursor)
    tail: AtomicUsize,

    /// Events discarded because the queue was full (producer-owned)
    dropped: AtomicUsize,

    /// Serializes consumers; never taken by the producer
    consumer: Mutex<()>,
}

// SAFETY: a slot is written by the producer only while it lies outside
// [tail, head), and read by a consumer only while it lies inside that
// range. The Release/Acquire pairs on head and tail order those accesses,
// and the consumer lock leaves at most one task moving tail.
unsafe impl<const C: usize> Sync for EventQueue<C> {}

impl<const C: usize> EventQueue<C> {
    const CAPACITY_OK: () = assert!(
        C > 0 && C.is_power_of_two(),
        "event queue capacity must be a non-zero power of two"
    );

    /// Create a new empty queue
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;
        Self {
            slots: [const { UnsafeCell::new(EdgeEvent::new(0, Level::Low)) }; C],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
            consumer: Mutex::new(()),
        }
    }

    /// Enqueue an event (producer side, interrupt context)
    ///
    /// Never blocks and never allocates. If the queue is full the event
    /// is discarded and `false` is returned; the events already queued
    /// are left untouched.
    pub fn try_push(&self, event: EdgeEvent) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head.wrapping_sub(tail) >= C {
            // Only the producer writes this counter, a plain store is enough
            let dropped = self.dropped.load(Ordering::Relaxed);
            self.dropped.store(dropped.wrapping_add(1), Ordering::Relaxed);
            return false;
        }

        unsafe {
            // SAFETY: head - tail < C, so slot head % C is not visible to
            // the consumer until the Release store below publishes it
            *self.slots[head % C].get() = event;
        }

        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Dequeue the oldest event (consumer side)
    ///
    /// Concurrent callers are serialized; each event is returned once.
    pub fn try_pop(&self) -> Option<EdgeEvent> {
        let _consumer = self.consumer.lock();
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let event = unsafe {
            // SAFETY: tail != head, the producer finished writing this slot
            // before its Release store of head, and it will not reuse the
            // slot until our Release store of tail below
            *self.slots[tail % C].get()
        };

        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(event)
    }

    /// Discard every queued event
    ///
    /// An edge that races with this call may either survive or be lost.
    pub fn clear(&self) {
        let _consumer = self.consumer.lock();
        let head = self.head.load(Ordering::Acquire);
        self.tail.store(head, Ordering::Release);
    }

    /// Number of unread events
    pub fn len(&self) -> usize {
        // tail first: head is never behind a tail value we already saw
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        head.wrapping_sub(tail).min(C)
    }

    /// Check if there are no unread events
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of events held at once
    #[inline]
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Total number of events dropped because the queue was full
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const C: usize> Default for EventQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(ts: u64) -> EdgeEvent {
        EdgeEvent::new(ts, Level::from_bit(ts as u32))
    }

    #[test]
    fn test_fifo_order() {
        let q: EventQueue<8> = EventQueue::new();
        for ts in 0..8 {
            assert!(q.try_push(ev(ts)));
        }
        assert_eq!(q.len(), 8);

        for ts in 0..8 {
            assert_eq!(q.try_pop(), Some(ev(ts)));
        }
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let q: EventQueue<4> = EventQueue::new();
        for ts in 0..4 {
            assert!(q.try_push(ev(ts)));
        }

        assert!(!q.try_push(ev(100)));
        assert!(!q.try_push(ev(101)));
        assert_eq!(q.len(), 4);
        assert_eq!(q.dropped(), 2);

        // Oldest events survive, the late arrivals are gone
        for ts in 0..4 {
            assert_eq!(q.try_pop(), Some(ev(ts)));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn test_clear_then_pop_is_empty() {
        let q: EventQueue<4> = EventQueue::new();
        q.try_push(ev(1));
        q.try_push(ev(2));
        q.clear();
        assert_eq!(q.try_pop(), None);
        assert_eq!(q.len(), 0);

        // Still usable after a clear
        assert!(q.try_push(ev(3)));
        assert_eq!(q.try_pop(), Some(ev(3)));
    }

    #[test]
    fn test_clear_on_empty_queue() {
        let q: EventQueue<2> = EventQueue::new();
        q.clear();
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn test_wrap_around_slots() {
        let q: EventQueue<4> = EventQueue::new();

        // Keep three events queued while cycling through the slots
        for ts in 0..3 {
            assert!(q.try_push(ev(ts)));
        }
        let mut next_pop = 0;
        for ts in 3..100 {
            assert!(q.try_push(ev(ts)));
            assert_eq!(q.len(), 4);
            assert_eq!(q.try_pop(), Some(ev(next_pop)));
            next_pop += 1;
        }
        assert_eq!(q.dropped(), 0);

        while let Some(e) = q.try_pop() {
            assert_eq!(e, ev(next_pop));
            next_pop += 1;
        }
        assert_eq!(next_pop, 100);
    }

    #[test]
    fn test_cursor_wrap_at_usize_max() {
        let q: EventQueue<4> = EventQueue::new();
        q.head.store(usize::MAX - 1, Ordering::Relaxed);
        q.tail.store(usize::MAX - 1, Ordering::Relaxed);

        for ts in 0..4 {
            assert!(q.try_push(ev(ts)));
        }
        assert!(!q.try_push(ev(99)));
        assert_eq!(q.len(), 4);

        for ts in 0..4 {
            assert_eq!(q.try_pop(), Some(ev(ts)));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn test_concurrent_producer_consumer() {
        const TOTAL: u64 = 50_000;
        let q: EventQueue<16> = EventQueue::new();

        std::thread::scope(|s| {
            s.spawn(|| {
                // Test producer retries instead of dropping so every
                // event eventually arrives
                let mut ts = 0;
                while ts < TOTAL {
                    if q.try_push(ev(ts)) {
                        ts += 1;
                    } else {
                        std::hint::spin_loop();
                    }
                }
            });

            let mut expected = 0;
            while expected < TOTAL {
                assert!(q.len() <= 16);
                match q.try_pop() {
                    Some(e) => {
                        // Timestamp and level must come from the same push
                        assert_eq!(e, ev(expected));
                        expected += 1;
                    }
                    None => std::hint::spin_loop(),
                }
            }
        });

        assert!(q.is_empty());
    }

    #[test]
    fn test_competing_consumers_never_duplicate() {
        const TOTAL: u64 = 20_000;
        let q: EventQueue<4> = EventQueue::new();
        let done = std::sync::atomic::AtomicBool::new(false);

        // One task pops, the other pops and clears, as two readers of one
        // device would with read and CLEAR_QUEUE
        let (a, b) = std::thread::scope(|s| {
            s.spawn(|| {
                let mut ts = 0;
                while ts < TOTAL {
                    if q.try_push(ev(ts)) {
                        ts += 1;
                    } else {
                        std::hint::spin_loop();
                    }
                }
                done.store(true, Ordering::Release);
            });

            let popper = s.spawn(|| {
                let mut seen = std::vec::Vec::new();
                while !done.load(Ordering::Acquire) || !q.is_empty() {
                    if let Some(e) = q.try_pop() {
                        seen.push(e.timestamp_us);
                    }
                }
                seen
            });
            let clearer = s.spawn(|| {
                let mut seen = std::vec::Vec::new();
                let mut round = 0u32;
                while !done.load(Ordering::Acquire) || !q.is_empty() {
                    if let Some(e) = q.try_pop() {
                        seen.push(e.timestamp_us);
                    }
                    round = round.wrapping_add(1);
                    if round % 64 == 0 {
                        q.clear();
                    }
                }
                seen
            });

            (popper.join().unwrap(), clearer.join().unwrap())
        });

        // Each consumer sees a strictly increasing subsequence
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert!(b.windows(2).all(|w| w[0] < w[1]));

        // And no event reaches both of them
        let mut all: std::vec::Vec<u64> = a.iter().chain(b.iter()).copied().collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
        assert!(q.is_empty());
    }
}
