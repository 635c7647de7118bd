//! Atomic primitives used by the ring.
//!
//! `core::sync::atomic` by default. With the `portable-atomic` feature the same
//! names come from the `portable-atomic` crate. On cores without
//! compare-and-swap (Cortex-M0/M0+, RV32I) it needs a backend, selected with
//! `portable-atomic-critical-section` or
//! `portable-atomic-unsafe-assume-single-core`.

#[cfg(not(feature = "portable-atomic"))]
pub(crate) use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

#[cfg(feature = "portable-atomic")]
pub(crate) use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};
