//! Single-slot mailbox between the sampling trigger and the display loop
//!
//! The mailbox holds the most recent distance together with a freshness
//! flag. It has exactly one writer ([`Publisher`], owned by the trigger) and
//! one reader ([`Receiver`], owned by the consumer loop). Both handles come
//! from a single [`Mailbox::split`], so the type system enforces the
//! single-writer/single-reader discipline.
//!
//! # Layout
//!
//! The whole slot is one 64-bit atomic word:
//!
//! ```text
//!  63            33   32   31                 0
//! ┌────────────────┬─────┬────────────────────┐
//! │ generation     │fresh│ distance (0.001cm) │
//! └────────────────┴─────┴────────────────────┘
//! ```
//!
//! Value and flag are committed by one store, so the reader can never see a
//! flag paired with a value the writer did not write together with it.
//!
//! # Read-then-clear
//!
//! The reader first loads the word, then clears the flag with a
//! compare-exchange against exactly the word it loaded. If the writer
//! committed anything in between, the exchange fails and the flag stays
//! set, so the newer value is picked up on the next cycle. The generation
//! counter makes two writes of the same distance distinguishable.
//!
//! Values overwritten before the reader gets to them are dropped: the
//! reader always gets the newest value, never a backlog.

use portable_atomic::{AtomicU64, Ordering};

use crate::distance::Distance;

const VALUE_MASK: u64 = 0xFFFF_FFFF;
const FRESH_BIT: u64 = 1 << 32;
const GENERATION_SHIFT: u32 = 33;
const GENERATION_MASK: u32 = (1 << (64 - GENERATION_SHIFT)) - 1;

/// Pack a committed value into a slot word
const fn pack(value: Distance, generation: u32) -> u64 {
    ((generation & GENERATION_MASK) as u64) << GENERATION_SHIFT
        | FRESH_BIT
        | value.thousandths() as u64
}

const fn unpack_value(word: u64) -> Distance {
    Distance::from_thousandths((word & VALUE_MASK) as u32)
}

const fn unpack_generation(word: u64) -> u32 {
    (word >> GENERATION_SHIFT) as u32 & GENERATION_MASK
}

/// Shared single-slot storage
///
/// Create once (typically in a `static` or `StaticCell`) and call
/// [`split`](Self::split) to obtain the two endpoint handles.
pub struct Mailbox {
    slot: AtomicU64,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    /// Create an empty mailbox (`fresh = false`, value zero)
    pub const fn new() -> Self {
        Self {
            slot: AtomicU64::new(0),
        }
    }

    /// Split into the producer and consumer endpoints
    pub fn split(&mut self) -> (Publisher<'_>, Receiver<'_>) {
        let slot = &self.slot;
        let generation = unpack_generation(slot.load(Ordering::Acquire));
        (
            Publisher { slot, generation },
            Receiver {
                slot,
                observed: None,
            },
        )
    }

    /// Check whether an unread value is waiting
    pub fn is_fresh(&self) -> bool {
        self.slot.load(Ordering::Acquire) & FRESH_BIT != 0
    }
}

/// Writing endpoint, owned by the periodic trigger
pub struct Publisher<'a> {
    slot: &'a AtomicU64,
    generation: u32,
}

impl Publisher<'_> {
    /// Commit a new value and mark it fresh
    ///
    /// Any value the reader has not yet taken is replaced.
    pub fn publish(&mut self, value: Distance) {
        self.generation = self.generation.wrapping_add(1) & GENERATION_MASK;
        self.slot
            .store(pack(value, self.generation), Ordering::Release);
    }

    /// Number of values committed so far (wraps at 31 bits)
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Reading endpoint, owned by the consumer loop
pub struct Receiver<'a> {
    slot: &'a AtomicU64,
    /// Slot word seen by the last successful `peek`
    observed: Option<u64>,
}

impl Receiver<'_> {
    /// Check whether an unread value is waiting
    pub fn is_fresh(&self) -> bool {
        self.slot.load(Ordering::Acquire) & FRESH_BIT != 0
    }

    /// Read the pending value without clearing the flag
    ///
    /// Returns `None` when nothing fresh is waiting. A subsequent
    /// [`clear`](Self::clear) acknowledges exactly the value returned here.
    pub fn peek(&mut self) -> Option<Distance> {
        let word = self.slot.load(Ordering::Acquire);
        if word & FRESH_BIT == 0 {
            self.observed = None;
            return None;
        }
        self.observed = Some(word);
        Some(unpack_value(word))
    }

    /// Clear the flag for the value returned by the last `peek`
    ///
    /// Returns `true` if the flag was cleared. Returns `false` if there was
    /// nothing to acknowledge or the writer committed a newer value since
    /// the peek; in that case the flag stays set.
    pub fn clear(&mut self) -> bool {
        let Some(word) = self.observed.take() else {
            return false;
        };
        self.slot
            .compare_exchange(word, word & !FRESH_BIT, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Read the pending value and then clear its flag
    pub fn take(&mut self) -> Option<Distance> {
        let value = self.peek()?;
        self.clear();
        Some(value)
    }

    /// Spin until a fresh value is available, then take it
    pub fn wait_blocking(&mut self) -> Distance {
        loop {
            if let Some(value) = self.take() {
                return value;
            }
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn d(v: u32) -> Distance {
        Distance::from_thousandths(v)
    }

    #[test]
    fn test_starts_empty() {
        let mut mailbox = Mailbox::new();
        assert!(!mailbox.is_fresh());
        let (_tx, mut rx) = mailbox.split();
        assert_eq!(rx.peek(), None);
        assert_eq!(rx.take(), None);
        assert!(!rx.clear());
    }

    #[test]
    fn test_publish_then_take() {
        let mut mailbox = Mailbox::new();
        let (mut tx, mut rx) = mailbox.split();

        tx.publish(d(2210));
        assert!(rx.is_fresh());
        assert_eq!(rx.take(), Some(d(2210)));
        assert!(!rx.is_fresh());
        assert_eq!(rx.take(), None);
    }

    #[test]
    fn test_newest_wins() {
        let mut mailbox = Mailbox::new();
        let (mut tx, mut rx) = mailbox.split();

        tx.publish(d(1));
        tx.publish(d(2));
        tx.publish(d(3));
        assert_eq!(rx.take(), Some(d(3)));
        assert_eq!(rx.take(), None);
    }

    #[test]
    fn test_write_between_read_and_clear_is_kept() {
        let mut mailbox = Mailbox::new();
        let (mut tx, mut rx) = mailbox.split();

        tx.publish(d(100));
        assert_eq!(rx.peek(), Some(d(100)));

        // Trigger preempts the consumer here
        tx.publish(d(200));

        assert!(!rx.clear());
        assert!(rx.is_fresh());
        assert_eq!(rx.take(), Some(d(200)));
        assert!(!rx.is_fresh());
    }

    #[test]
    fn test_same_value_rewrite_between_read_and_clear_is_kept() {
        let mut mailbox = Mailbox::new();
        let (mut tx, mut rx) = mailbox.split();

        tx.publish(d(500));
        assert_eq!(rx.peek(), Some(d(500)));
        tx.publish(d(500));

        assert!(!rx.clear());
        assert!(rx.is_fresh());
    }

    #[test]
    fn test_generation_counts_and_wraps() {
        let mut mailbox = Mailbox::new();
        let (mut tx, mut rx) = mailbox.split();
        assert_eq!(tx.generation(), 0);
        tx.publish(d(1));
        tx.publish(d(2));
        assert_eq!(tx.generation(), 2);

        tx.generation = GENERATION_MASK;
        tx.publish(d(7));
        assert_eq!(tx.generation(), 0);
        assert_eq!(rx.take(), Some(d(7)));
    }

    #[test]
    fn test_full_width_value_survives_packing() {
        let mut mailbox = Mailbox::new();
        let (mut tx, mut rx) = mailbox.split();
        tx.publish(d(u32::MAX));
        assert_eq!(rx.take(), Some(d(u32::MAX)));
    }

    /// Steps of one consumer cycle
    #[derive(Clone, Copy)]
    enum ConsumerStep {
        Read,
        Clear,
    }

    /// Run every interleaving of `writes` producer commits with `cycles`
    /// consumer read/clear pairs, preempting at each step boundary.
    #[test]
    fn test_interleavings_never_tear_or_lose_newest() {
        const WRITES: u32 = 4;
        const CYCLES: u32 = 3;
        const STEPS: u32 = WRITES + 2 * CYCLES;

        let mut schedules = 0;
        for mask in 0u32..(1 << STEPS) {
            if mask.count_ones() != WRITES {
                continue;
            }
            schedules += 1;

            let mut mailbox = Mailbox::new();
            let (mut tx, mut rx) = mailbox.split();

            let mut written = 0u32; // values written are 1..=WRITES
            let mut consumer_pc = 0u32;
            let mut delivered: Option<u32> = None;

            for step in 0..STEPS {
                if mask & (1 << step) != 0 {
                    written += 1;
                    tx.publish(d(written * 10));
                    continue;
                }

                let op = if consumer_pc % 2 == 0 {
                    ConsumerStep::Read
                } else {
                    ConsumerStep::Clear
                };
                consumer_pc += 1;

                match op {
                    ConsumerStep::Read => {
                        if let Some(v) = rx.peek() {
                            let v = v.thousandths();
                            // Must be the newest committed value, never a mix
                            assert_eq!(v, written * 10, "schedule {:#b}", mask);
                            if let Some(prev) = delivered {
                                assert!(v >= prev);
                            }
                            delivered = Some(v);
                        }
                    }
                    ConsumerStep::Clear => {
                        rx.clear();
                    }
                }
            }

            // The newest value is either already acknowledged or still fresh
            let newest = written * 10;
            if rx.is_fresh() {
                assert_eq!(rx.take(), Some(d(newest)));
            } else {
                assert_eq!(delivered, Some(newest), "schedule {:#b}", mask);
            }
        }
        assert_eq!(schedules, 210);
    }

    #[test]
    fn test_threaded_stress_newest_wins() {
        use std::thread;

        const COUNT: u32 = 50_000;
        let mut mailbox = Mailbox::new();
        let (mut tx, mut rx) = mailbox.split();

        thread::scope(|s| {
            s.spawn(move || {
                for i in 1..=COUNT {
                    tx.publish(d(i));
                }
            });

            let mut last = 0;
            while last < COUNT {
                if let Some(v) = rx.take() {
                    let v = v.thousandths();
                    assert!(v > last, "went from {} to {}", last, v);
                    assert!(v <= COUNT);
                    last = v;
                } else {
                    core::hint::spin_loop();
                }
            }
        });
    }
}
