use crate::invariants::{
    debug_assert_bounded_level, debug_assert_readable, debug_assert_single_step,
};
use crate::storage::Storage;
use crate::sync::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use crate::{
    ConfigError, Consumer, DefaultPolicy, HandleError, OverflowPolicy, Producer, RingConfig,
    Status,
};
use core::fmt;
use core::marker::PhantomData;
use crossbeam_utils::CachePadded;

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// ## Sequence Numbers
//
// `write` and `read` are free-running `usize` sequence numbers, not wrapped
// indices. The slot index is `seq & (N - 1)` and the level is
// `write - read` (wrapping). Consequences:
// - Empty is `write == read`, full is `write - read == N`, so all N slots are
//   usable and no slot is reserved as a full/empty disambiguator.
// - The read cursor never repeats a value within a realistic run, which keeps
//   the overwrite-oldest CAS free of ABA.
//
// ## Memory Ordering Protocol
//
// **Producer (push, interrupt context):**
// 1. Load `write` with Relaxed (only the producer writes it)
// 2. Load `read` with Acquire (synchronizes with the consumer's release)
// 3. Store the byte into its slot (Relaxed, ordered by step 4)
// 4. Store `write` with Release (publishes the byte)
//
// **Consumer (pop, main loop):**
// 1. Load `read` with Acquire
// 2. Load `write` with Acquire (synchronizes with step 4 above)
// 3. Load the byte from its slot
// 4. Advance `read` with Release (drop-newest) or AcqRel CAS (overwrite-oldest)
//
// ## Shared Writers
//
// - `read` has a second writer under overwrite-oldest: a push on a full ring
//   displaces the oldest byte by CAS-ing `read` forward before it reuses the
//   slot. Whichever of pop/displace wins the CAS owns that byte; the loser
//   retries (pop) or finds free space (push).
// - `high_watermark` is raised by the producer and cleared by the consumer,
//   each through a CAS, so every edge is applied exactly once. A clear based
//   on a level sampled before a refill can land late; every push on a full
//   ring re-raises the flag, so it is never clear for more than one push
//   while the ring is full.
// - `overflow` has a single writer (the producer): load + store, no RMW.
//
// =============================================================================

/// Fixed-capacity SPSC byte ring with watermark hysteresis.
///
/// `N` is the capacity in bytes and must be a power of two; any other value is
/// rejected when the type is instantiated. `P` picks the overflow policy at
/// compile time.
///
/// The ring is meant to live in a `static`, filled from an interrupt handler
/// through a [`Producer`] and drained from the main loop through a
/// [`Consumer`]. At most one of each can be claimed at a time.
///
/// All `N` slots are usable. Firmware that detects "full" as
/// `next(write) == read` on wrapped indices only ever holds `N - 1` bytes;
/// this ring tracks free-running cursors instead.
///
/// # Memory Layout
///
/// ```text
/// ┌──────────────────────────────────────────────────────────┐
/// │ write: CachePadded<AtomicUsize>   ← producer writes      │
/// ├──────────────────────────────────────────────────────────┤
/// │ read: CachePadded<AtomicUsize>    ← consumer writes      │
/// ├──────────────────────────────────────────────────────────┤
/// │ overflow, high_watermark, claims, config                 │
/// ├──────────────────────────────────────────────────────────┤
/// │ storage: [AtomicU8; N]                                   │
/// └──────────────────────────────────────────────────────────┘
/// ```
#[repr(C)]
pub struct RingBuffer<const N: usize, P: OverflowPolicy = DefaultPolicy> {
    /// Next sequence to write (producer-owned)
    write: CachePadded<AtomicUsize>,
    /// Next sequence to read (consumer-owned; shared under overwrite-oldest)
    read: CachePadded<AtomicUsize>,

    /// Dropped or displaced bytes (producer-owned)
    overflow: AtomicU32,
    /// Watermark hysteresis flag
    high_watermark: AtomicBool,
    producer_claimed: AtomicBool,
    consumer_claimed: AtomicBool,

    config: RingConfig,
    storage: Storage<N>,
    _policy: PhantomData<P>,
}

impl<const N: usize, P: OverflowPolicy> RingBuffer<N, P> {
    /// Creates a ring with 75 % / 25 % watermarks.
    ///
    /// ```
    /// use isr_ring::RingBuffer;
    ///
    /// static RX: RingBuffer<64> = RingBuffer::new();
    /// assert!(RX.is_empty());
    /// ```
    pub const fn new() -> Self {
        Self::with_config(RingConfig::for_capacity(N))
    }

    /// Creates a ring with explicit watermarks.
    ///
    /// Intended for `static`/`const` initializers, where an invalid
    /// configuration stops the build. Use [`try_with_config`](Self::try_with_config)
    /// for values only known at run time.
    ///
    /// # Panics
    ///
    /// Panics (at compile time in a const context) if `config` fails
    /// [`RingConfig::validate`] for capacity `N`.
    pub const fn with_config(config: RingConfig) -> Self {
        match config.validate(N) {
            Ok(()) => Self::build(config),
            Err(ConfigError::LowNotBelowHigh { .. }) => {
                panic!("ring low watermark must be below the high watermark")
            }
            Err(ConfigError::HighAboveCapacity { .. }) => {
                panic!("ring high watermark exceeds capacity")
            }
        }
    }

    /// Creates a ring, reporting an invalid configuration as an error.
    pub fn try_with_config(config: RingConfig) -> Result<Self, ConfigError> {
        config.validate(N)?;
        Ok(Self::build(config))
    }

    const fn build(config: RingConfig) -> Self {
        Self {
            write: CachePadded::new(AtomicUsize::new(0)),
            read: CachePadded::new(AtomicUsize::new(0)),
            overflow: AtomicU32::new(0),
            high_watermark: AtomicBool::new(false),
            producer_claimed: AtomicBool::new(false),
            consumer_claimed: AtomicBool::new(false),
            config,
            storage: Storage::new(),
            _policy: PhantomData,
        }
    }

    /// Returns cursors, overflow counter and watermark flag to their initial
    /// state. Stored bytes become unreachable; they are not zeroed.
    ///
    /// Needs `&mut self`, so no handle can be alive while it runs.
    pub fn reset(&mut self) {
        *self.write.get_mut() = 0;
        *self.read.get_mut() = 0;
        *self.overflow.get_mut() = 0;
        *self.high_watermark.get_mut() = false;
    }

    // ---------------------------------------------------------------------
    // HANDLES
    // ---------------------------------------------------------------------

    /// Claims the producer side. Fails while another `Producer` is alive.
    pub fn producer(&self) -> Result<Producer<'_, N, P>, HandleError> {
        if self.producer_claimed.swap(true, Ordering::AcqRel) {
            return Err(HandleError::ProducerClaimed);
        }
        Ok(Producer::new(self))
    }

    /// Claims the consumer side. Fails while another `Consumer` is alive.
    pub fn consumer(&self) -> Result<Consumer<'_, N, P>, HandleError> {
        if self.consumer_claimed.swap(true, Ordering::AcqRel) {
            return Err(HandleError::ConsumerClaimed);
        }
        Ok(Consumer::new(self))
    }

    /// Claims both sides at once.
    pub fn split(&self) -> Result<(Producer<'_, N, P>, Consumer<'_, N, P>), HandleError> {
        let producer = self.producer()?;
        let consumer = self.consumer()?;
        Ok((producer, consumer))
    }

    pub(crate) fn release_producer(&self) {
        self.producer_claimed.store(false, Ordering::Release);
    }

    pub(crate) fn release_consumer(&self) {
        self.consumer_claimed.store(false, Ordering::Release);
    }

    // ---------------------------------------------------------------------
    // CONSTANTS & STATUS
    // ---------------------------------------------------------------------

    /// Returns the configured capacity `N`.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns how many bytes the ring can hold at once. Always `N`.
    #[inline]
    pub const fn usable_capacity(&self) -> usize {
        N
    }

    /// Returns the watermark configuration.
    #[inline]
    pub const fn config(&self) -> RingConfig {
        self.config
    }

    /// Returns the overflow policy name.
    #[inline]
    pub fn policy_name(&self) -> &'static str {
        P::NAME
    }

    /// Returns the current number of stored bytes.
    ///
    /// A snapshot: the read cursor is loaded first so a concurrent push can
    /// only make the result lag, never go negative.
    #[inline]
    pub fn len(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        write.wrapping_sub(read).min(N)
    }

    /// Returns true if the ring holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read.load(Ordering::Acquire) == self.write.load(Ordering::Acquire)
    }

    /// Returns true if the next push would hit the overflow policy.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /// Returns the number of dropped or displaced bytes.
    #[inline]
    pub fn overflow_count(&self) -> u32 {
        self.overflow.load(Ordering::Relaxed)
    }

    /// Returns the watermark hysteresis flag.
    #[inline]
    pub fn is_high_watermark_active(&self) -> bool {
        self.high_watermark.load(Ordering::Acquire)
    }

    /// Returns a snapshot of level, overflow count and watermark flag.
    pub fn status(&self) -> Status {
        let level = self.len();
        Status {
            level,
            overflow_count: self.overflow_count(),
            high_watermark_active: self.is_high_watermark_active(),
            utilization_percent: (level * 100 / N) as u8,
        }
    }

    // ---------------------------------------------------------------------
    // PRODUCER PATH
    // ---------------------------------------------------------------------

    /// Stores one byte. Non-blocking, bounded time, never panics.
    ///
    /// Returns `false` only when the ring is full under drop-newest.
    #[inline]
    pub(crate) fn push_inner(&self, byte: u8) -> bool {
        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N {
            // Full is at or above any valid high watermark. Re-raising here
            // undoes a clear that raced with the pushes that refilled the ring.
            self.raise_high_watermark();
            if !P::OVERWRITE_OLDEST {
                self.record_overflow();
                return false;
            }
            // Evict the oldest byte before reusing its slot. Level and flag
            // stay as they are: one byte out, one byte in.
            if self
                .read
                .compare_exchange(read, read.wrapping_add(1), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.record_overflow();
                self.publish(write, byte);
                return true;
            }
            // Lost to a pop: that pop freed the slot we are about to use.
        }

        let new_write = self.publish(write, byte);

        if !self.high_watermark.load(Ordering::Relaxed) {
            let level = new_write.wrapping_sub(self.read.load(Ordering::Acquire));
            debug_assert_bounded_level!(level, N);
            if level >= self.config.high_watermark {
                self.raise_high_watermark();
            }
        }
        true
    }

    #[inline]
    fn raise_high_watermark(&self) {
        if !self.high_watermark.load(Ordering::Relaxed) {
            let _ = self.high_watermark.compare_exchange(
                false,
                true,
                Ordering::AcqRel,
                Ordering::Relaxed,
            );
        }
    }

    #[inline]
    fn publish(&self, write: usize, byte: u8) -> usize {
        self.storage.write(write, byte);
        let new_write = write.wrapping_add(1);
        debug_assert_single_step!("write", write, new_write);
        self.write.store(new_write, Ordering::Release);
        new_write
    }

    #[inline]
    fn record_overflow(&self) {
        let count = self.overflow.load(Ordering::Relaxed);
        self.overflow.store(count.wrapping_add(1), Ordering::Relaxed);
    }

    // ---------------------------------------------------------------------
    // CONSUMER PATH
    // ---------------------------------------------------------------------

    /// Removes the oldest byte, or returns `None` when empty.
    #[inline]
    pub(crate) fn pop_inner(&self) -> Option<u8> {
        loop {
            let read = self.read.load(Ordering::Acquire);
            let write = self.write.load(Ordering::Acquire);
            if read == write {
                return None;
            }

            debug_assert_readable!(read, read, write);
            let byte = self.storage.read(read);
            let next = read.wrapping_add(1);

            if P::OVERWRITE_OLDEST {
                if self
                    .read
                    .compare_exchange(read, next, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    // Displaced by the producer while we sampled it.
                    continue;
                }
            } else {
                self.read.store(next, Ordering::Release);
            }
            debug_assert_single_step!("read", read, next);

            if self.high_watermark.load(Ordering::Relaxed) {
                let level = self.write.load(Ordering::Acquire).wrapping_sub(next);
                if level <= self.config.low_watermark {
                    let _ = self.high_watermark.compare_exchange(
                        true,
                        false,
                        Ordering::AcqRel,
                        Ordering::Relaxed,
                    );
                }
            }
            return Some(byte);
        }
    }
}

impl<const N: usize, P: OverflowPolicy> Default for RingBuffer<N, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, P: OverflowPolicy> fmt::Debug for RingBuffer<N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &N)
            .field("policy", &P::NAME)
            .field("config", &self.config)
            .field("status", &self.status())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
