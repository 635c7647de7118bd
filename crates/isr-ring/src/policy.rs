//! Overflow policies: what a push does when the ring is full.
//!
//! The policy is a type parameter of [`RingBuffer`](crate::RingBuffer), so the
//! branch that is not chosen is constant-folded away. The `overwrite-oldest`
//! Cargo feature flips [`DefaultPolicy`] for builds that want the alternate
//! behavior everywhere without spelling out the type.

mod sealed {
    pub trait Sealed {}
}

/// Compile-time overflow policy.
pub trait OverflowPolicy: sealed::Sealed + Send + Sync + 'static {
    /// `true` if a push on a full ring evicts the oldest byte.
    const OVERWRITE_OLDEST: bool;
    /// Short name for diagnostics.
    const NAME: &'static str;
}

/// Discard the incoming byte; `push` returns `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropNewest;

/// Evict the oldest unread byte and store the incoming one; `push` returns `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverwriteOldest;

impl sealed::Sealed for DropNewest {}
impl sealed::Sealed for OverwriteOldest {}

impl OverflowPolicy for DropNewest {
    const OVERWRITE_OLDEST: bool = false;
    const NAME: &'static str = "drop-newest";
}

impl OverflowPolicy for OverwriteOldest {
    const OVERWRITE_OLDEST: bool = true;
    const NAME: &'static str = "overwrite-oldest";
}

/// Policy used when the type parameter is omitted.
#[cfg(not(feature = "overwrite-oldest"))]
pub type DefaultPolicy = DropNewest;

/// Policy used when the type parameter is omitted.
#[cfg(feature = "overwrite-oldest")]
pub type DefaultPolicy = OverwriteOldest;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RingBuffer;

    fn fill_past_capacity(ring: &RingBuffer<8>) -> Vec<u8> {
        for b in 0..10 {
            ring.push_inner(b);
        }
        core::iter::from_fn(|| ring.pop_inner()).collect()
    }

    #[cfg(not(feature = "overwrite-oldest"))]
    #[test]
    fn test_default_policy_drops_newest() {
        let ring: RingBuffer<8> = RingBuffer::new();
        assert_eq!(ring.policy_name(), DropNewest::NAME);
        assert_eq!(fill_past_capacity(&ring), (0..8).collect::<Vec<u8>>());
        assert_eq!(ring.overflow_count(), 2);
    }

    #[cfg(feature = "overwrite-oldest")]
    #[test]
    fn test_default_policy_overwrites_oldest() {
        let ring: RingBuffer<8> = RingBuffer::new();
        assert_eq!(ring.policy_name(), OverwriteOldest::NAME);
        assert_eq!(fill_past_capacity(&ring), (2..10).collect::<Vec<u8>>());
        assert_eq!(ring.overflow_count(), 2);
    }
}
