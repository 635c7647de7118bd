//! Producer and consumer handles: the SPSC contract as types.
//!
//! Each handle is a claim on one side of a [`RingBuffer`]. Handles are not
//! `Clone` and not `Sync`, so a side can be moved to the context that owns it
//! but never shared with a second one. Dropping a handle releases the claim.

use crate::{DefaultPolicy, OverflowPolicy, RingBuffer, Status};
use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;

/// `Send` but not `Sync`.
type NotSync = PhantomData<Cell<()>>;

/// The write side of a ring. Lives in the receive interrupt.
pub struct Producer<'a, const N: usize, P: OverflowPolicy = DefaultPolicy> {
    ring: &'a RingBuffer<N, P>,
    _not_sync: NotSync,
}

impl<'a, const N: usize, P: OverflowPolicy> Producer<'a, N, P> {
    pub(crate) fn new(ring: &'a RingBuffer<N, P>) -> Self {
        Self {
            ring,
            _not_sync: PhantomData,
        }
    }

    /// Stores one byte.
    ///
    /// Non-blocking and bounded-time, safe to call from an interrupt handler.
    /// On a full ring the overflow counter is bumped and the policy decides:
    /// drop-newest discards `byte` and returns `false`; overwrite-oldest evicts
    /// the oldest unread byte, stores `byte` and returns `true`.
    #[inline]
    pub fn push(&self, byte: u8) -> bool {
        self.ring.push_inner(byte)
    }

    /// Returns a snapshot of the ring.
    #[inline]
    pub fn status(&self) -> Status {
        self.ring.status()
    }

    /// Returns the ring this handle writes to.
    #[inline]
    pub fn ring(&self) -> &'a RingBuffer<N, P> {
        self.ring
    }
}

impl<const N: usize, P: OverflowPolicy> Drop for Producer<'_, N, P> {
    fn drop(&mut self) {
        self.ring.release_producer();
    }
}

impl<const N: usize, P: OverflowPolicy> fmt::Debug for Producer<'_, N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").field("ring", self.ring).finish()
    }
}

/// The read side of a ring. Lives in the main loop.
pub struct Consumer<'a, const N: usize, P: OverflowPolicy = DefaultPolicy> {
    ring: &'a RingBuffer<N, P>,
    _not_sync: NotSync,
}

impl<'a, const N: usize, P: OverflowPolicy> Consumer<'a, N, P> {
    pub(crate) fn new(ring: &'a RingBuffer<N, P>) -> Self {
        Self {
            ring,
            _not_sync: PhantomData,
        }
    }

    /// Removes the oldest byte. `None` means the ring is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<u8> {
        self.ring.pop_inner()
    }

    /// Pops until empty, handing each byte to `handler`. Returns the count.
    ///
    /// Bytes pushed while draining are drained too, so the loop ends only when
    /// the consumer catches up with the producer.
    pub fn drain<F>(&mut self, mut handler: F) -> usize
    where
        F: FnMut(u8),
    {
        let mut drained = 0;
        while let Some(byte) = self.ring.pop_inner() {
            handler(byte);
            drained += 1;
        }
        drained
    }

    /// Pops at most `max` bytes, handing each to `handler`. Returns the count.
    ///
    /// Bounds the time spent per call when the main loop has other work.
    pub fn drain_up_to<F>(&mut self, max: usize, mut handler: F) -> usize
    where
        F: FnMut(u8),
    {
        let mut drained = 0;
        while drained < max {
            match self.ring.pop_inner() {
                Some(byte) => {
                    handler(byte);
                    drained += 1;
                }
                None => break,
            }
        }
        drained
    }

    /// Returns the number of stored bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns true if there is nothing to pop.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns a snapshot of the ring.
    #[inline]
    pub fn status(&self) -> Status {
        self.ring.status()
    }

    /// Returns the ring this handle reads from.
    #[inline]
    pub fn ring(&self) -> &'a RingBuffer<N, P> {
        self.ring
    }
}

impl<const N: usize, P: OverflowPolicy> Drop for Consumer<'_, N, P> {
    fn drop(&mut self) {
        self.ring.release_consumer();
    }
}

impl<const N: usize, P: OverflowPolicy> fmt::Debug for Consumer<'_, N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").field("ring", self.ring).finish()
    }
}

impl<const N: usize, P: OverflowPolicy> Iterator for Consumer<'_, N, P> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.pop()
    }
}

#[cfg(test)]
mod tests {
    use crate::{DropNewest, OverwriteOldest, RingBuffer, RingConfig};

    #[test]
    fn test_push_pop_through_handles() {
        let ring: RingBuffer<8, DropNewest> = RingBuffer::new();
        let (producer, mut consumer) = ring.split().unwrap();

        assert!(producer.push(b'h'));
        assert!(producer.push(b'i'));
        assert_eq!(consumer.len(), 2);
        assert_eq!(consumer.pop(), Some(b'h'));
        assert_eq!(consumer.pop(), Some(b'i'));
        assert_eq!(consumer.pop(), None);
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_drain_empties_ring() {
        let ring: RingBuffer<16, DropNewest> = RingBuffer::new();
        let (producer, mut consumer) = ring.split().unwrap();
        for b in b"hello" {
            producer.push(*b);
        }

        let mut out = Vec::new();
        assert_eq!(consumer.drain(|b| out.push(b)), 5);
        assert_eq!(out, b"hello");
        assert_eq!(consumer.drain(|_| unreachable!()), 0);
    }

    #[test]
    fn test_drain_up_to_respects_budget() {
        let ring: RingBuffer<16, DropNewest> = RingBuffer::new();
        let (producer, mut consumer) = ring.split().unwrap();
        for b in 0..10 {
            producer.push(b);
        }

        let mut out = Vec::new();
        assert_eq!(consumer.drain_up_to(4, |b| out.push(b)), 4);
        assert_eq!(consumer.len(), 6);
        assert_eq!(consumer.drain_up_to(0, |b| out.push(b)), 0);
        assert_eq!(consumer.drain_up_to(100, |b| out.push(b)), 6);
        assert_eq!(out, (0..10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_handle_status_matches_ring() {
        let ring: RingBuffer<8, OverwriteOldest> =
            RingBuffer::try_with_config(RingConfig::new(6, 2)).unwrap();
        let (producer, consumer) = ring.split().unwrap();
        for b in 0..9 {
            assert!(producer.push(b));
        }
        assert_eq!(producer.status(), consumer.status());
        assert_eq!(consumer.status().overflow_count, 1);
        assert!(consumer.status().high_watermark_active);
    }

    #[test]
    fn test_consumer_iterates_until_empty() {
        let ring: RingBuffer<8, DropNewest> = RingBuffer::new();
        let (producer, consumer) = ring.split().unwrap();
        producer.push(1);
        producer.push(2);
        assert_eq!(consumer.collect::<Vec<u8>>(), vec![1, 2]);
    }

    #[test]
    fn test_claim_released_on_drop() {
        let ring: RingBuffer<8, DropNewest> = RingBuffer::new();
        {
            let _producer = ring.producer().unwrap();
            assert!(ring.producer().is_err());
        }
        assert!(ring.producer().is_ok());
    }
}
