//! isr-ring - Lock-Free SPSC Byte Ring for Interrupt Handoff
//!
//! A fixed-capacity byte ring that carries data from an interrupt handler (the
//! producer) to a cooperative main loop (the consumer), plus a watermark flag
//! with hysteresis for driving flow control.
//!
//! # Key Features
//!
//! - Power-of-two capacity as a const generic, checked at build time
//! - Bitmask indexing on free-running cursors: all `N` slots usable
//! - Non-blocking, bounded-time, allocation-free push
//! - Overflow policy chosen at compile time: drop-newest or overwrite-oldest
//! - High/low watermark hysteresis, updated only on threshold crossings
//! - `const` constructors for `static` rings
//!
//! # Example
//!
//! ```
//! use isr_ring::{DropNewest, RingBuffer, RingConfig};
//!
//! static RX: RingBuffer<8, DropNewest> = RingBuffer::with_config(RingConfig::new(6, 2));
//!
//! let (producer, mut consumer) = RX.split().unwrap();
//!
//! // Interrupt side
//! for byte in *b"abcdef" {
//!     producer.push(byte);
//! }
//! assert!(RX.status().high_watermark_active);
//!
//! // Main loop side
//! let mut echoed = Vec::new();
//! consumer.drain(|byte| echoed.push(byte));
//! assert_eq!(echoed, b"abcdef");
//! assert!(!RX.status().high_watermark_active);
//! ```
//!
//! # Concurrency contract
//!
//! Exactly one producer context and one consumer context. The contract is
//! carried by [`Producer`] and [`Consumer`]: a ring hands out at most one of
//! each, and neither can be cloned or shared. [`RingBuffer::status`] is
//! read-only and may be called from anywhere; its fields form a snapshot that
//! can lag a concurrent push by one byte.
//!
//! # Overflow
//!
//! A push on a full ring never fails loudly. It increments the overflow
//! counter and then either discards the new byte ([`DropNewest`], the default)
//! or evicts the oldest unread one ([`OverwriteOldest`]). Enable the
//! `overwrite-oldest` Cargo feature to change [`DefaultPolicy`] for a build.
//!
//! # `no_std`
//!
//! The crate only uses `core`. On cores without compare-and-swap
//! (thumbv6m, riscv32i) enable `portable-atomic-critical-section` or
//! `portable-atomic-unsafe-assume-single-core`.
#![cfg_attr(not(test), no_std)]

mod config;
mod error;
mod handle;
mod invariants;
mod policy;
mod ring;
mod status;
mod storage;
mod sync;

pub use config::{RingConfig, UART_RX_CAPACITY, UART_RX_CONFIG};
pub use error::{ConfigError, HandleError};
pub use handle::{Consumer, Producer};
pub use policy::{DefaultPolicy, DropNewest, OverflowPolicy, OverwriteOldest};
pub use ring::RingBuffer;
pub use status::Status;
