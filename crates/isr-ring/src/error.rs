//! Error types for ring construction and handle claims.
//!
//! Nothing on the push/pop path returns an error: overflow is counted and an
//! empty pop is `None`.

use thiserror::Error;

/// Invalid watermark configuration.
///
/// A non-power-of-two capacity never reaches this type; it fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The low watermark is not strictly below the high watermark.
    #[error("low watermark {low} must be below high watermark {high}")]
    LowNotBelowHigh {
        /// The configured low watermark.
        low: usize,
        /// The configured high watermark.
        high: usize,
    },
    /// The high watermark is larger than the ring can ever hold.
    #[error("high watermark {high} exceeds ring capacity {capacity}")]
    HighAboveCapacity {
        /// The configured high watermark.
        high: usize,
        /// The ring capacity.
        capacity: usize,
    },
}

/// A second handle was requested for a side that already has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandleError {
    /// A `Producer` for this ring is still alive.
    #[error("producer handle already claimed")]
    ProducerClaimed,
    /// A `Consumer` for this ring is still alive.
    #[error("consumer handle already claimed")]
    ConsumerClaimed,
}

impl HandleError {
    /// Returns `true` if the producer side was the one already taken.
    #[inline]
    pub fn is_producer(&self) -> bool {
        matches!(self, Self::ProducerClaimed)
    }
}
