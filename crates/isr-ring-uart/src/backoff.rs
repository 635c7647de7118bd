use std::hint;
use std::thread;

/// Wait strategy for a transmit-ready flag.
///
/// Spins with PAUSE hints in doubling rounds, then yields to the scheduler.
/// Unlike a give-up backoff it never completes: a blocking byte sink keeps
/// waiting until the transmitter drains.
#[derive(Debug)]
pub struct TxBackoff {
    step: u32,
}

impl TxBackoff {
    const SPIN_LIMIT: u32 = 6; // 2^6 = 64 spins max before yielding

    /// Creates a new backoff instance.
    #[inline]
    pub fn new() -> Self {
        Self { step: 0 }
    }

    /// Waits a little longer than last time.
    #[inline]
    pub fn snooze(&mut self) {
        if self.step <= Self::SPIN_LIMIT {
            for _ in 0..1u32 << self.step {
                hint::spin_loop();
            }
            self.step += 1;
        } else {
            thread::yield_now();
        }
    }

    #[cfg(test)]
    fn is_yielding(&self) -> bool {
        self.step > Self::SPIN_LIMIT
    }

    /// Reset for the next byte.
    #[inline]
    pub fn reset(&mut self) {
        self.step = 0;
    }
}

impl Default for TxBackoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_progression() {
        let mut b = TxBackoff::new();
        assert_eq!(b.step, 0);

        b.snooze();
        assert_eq!(b.step, 1);

        while !b.is_yielding() {
            b.snooze();
        }
        // Yielding does not advance further.
        let step = b.step;
        b.snooze();
        assert_eq!(b.step, step);

        b.reset();
        assert_eq!(b.step, 0);
    }
}
