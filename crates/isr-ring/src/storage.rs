//! Fixed byte storage addressed by free-running sequence numbers.
//!
//! Slots are `AtomicU8` rather than `UnsafeCell<u8>`: under the overwrite-oldest
//! policy the producer may write a slot the consumer has just sampled, and the
//! consumer discards that sample when its read-cursor CAS fails. With atomic
//! slots the stale sample is a plain value, never a data race.

use crate::sync::{AtomicU8, Ordering};

/// `N` bytes, `N` a power of two.
pub(crate) struct Storage<const N: usize> {
    slots: [AtomicU8; N],
}

impl<const N: usize> Storage<N> {
    /// Evaluated per `N` at monomorphization, so a bad capacity is a build error.
    const POWER_OF_TWO: () = assert!(
        N.is_power_of_two(),
        "ring capacity must be a non-zero power of 2"
    );

    /// The mask for wrapping sequence numbers: `N - 1`.
    pub(crate) const MASK: usize = N.wrapping_sub(1);

    pub(crate) const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::POWER_OF_TWO;
        Self {
            slots: [const { AtomicU8::new(0) }; N],
        }
    }

    #[inline(always)]
    pub(crate) const fn index(seq: usize) -> usize {
        seq & Self::MASK
    }

    /// Ordering is supplied by the cursor that published the slot.
    #[inline]
    pub(crate) fn read(&self, seq: usize) -> u8 {
        self.slots[Self::index(seq)].load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn write(&self, seq: usize, byte: u8) {
        self.slots[Self::index(seq)].store(byte, Ordering::Relaxed);
    }
}
