//! Debug assertion macros for ring invariants.
//!
//! Only active in debug builds (`debug_assert!`), so release builds pay nothing.
//! None of these run on a value the other context can still change, so they
//! hold even with the producer preempting the consumer mid-operation.

// =============================================================================
// Bounded level: 0 ≤ write - read ≤ N
// =============================================================================

/// Assert that a level computed by the producer after a store fits the ring.
///
/// Used in: `RingBuffer::push_inner()` after publishing the write cursor
macro_rules! debug_assert_bounded_level {
    ($level:expr, $capacity:expr) => {
        debug_assert!(
            $level <= $capacity,
            "bounded level violated: level {} exceeds capacity {}",
            $level,
            $capacity
        )
    };
}

// =============================================================================
// Cursor progress: each successful operation advances exactly one cursor by one
// =============================================================================

/// Assert that a cursor moved forward by exactly one slot.
///
/// Used in: `push_inner()` for the write cursor, `pop_inner()` for the read cursor
macro_rules! debug_assert_single_step {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new.wrapping_sub($old) == 1,
            "cursor progress violated: {} went from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// Readable range: the consumer only samples slots in [read, write)
// =============================================================================

/// Assert that a sampled sequence number was published by the producer.
///
/// Used in: `pop_inner()` before reading storage
macro_rules! debug_assert_readable {
    ($seq:expr, $read:expr, $write:expr) => {
        debug_assert!(
            $seq.wrapping_sub($read) < $write.wrapping_sub($read),
            "readable range violated: slot seq {} outside [{}, {})",
            $seq,
            $read,
            $write
        )
    };
}

pub(crate) use debug_assert_bounded_level;
pub(crate) use debug_assert_readable;
pub(crate) use debug_assert_single_step;
