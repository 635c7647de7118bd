use crate::ByteSink;
use isr_ring::{Consumer, DefaultPolicy, OverflowPolicy, RingBuffer};
use tracing::trace;

/// Main-loop task that drains the receive ring into a byte sink.
///
/// Call [`run`](Self::run) on any cadence; each call empties the ring, so the
/// worst-case latency of a received byte is one loop iteration plus the time
/// the sink takes for the bytes ahead of it.
#[derive(Debug)]
pub struct EchoTask<'a, const N: usize, P: OverflowPolicy = DefaultPolicy> {
    consumer: Consumer<'a, N, P>,
    forwarded: u64,
}

impl<'a, const N: usize, P: OverflowPolicy> EchoTask<'a, N, P> {
    /// Wraps a claimed consumer handle.
    pub fn new(consumer: Consumer<'a, N, P>) -> Self {
        Self {
            consumer,
            forwarded: 0,
        }
    }

    /// Claims the consumer side of `ring`.
    pub fn attach(ring: &'a RingBuffer<N, P>) -> Result<Self, isr_ring::HandleError> {
        ring.consumer().map(Self::new)
    }

    /// Pops until empty, forwarding every byte. Returns how many were forwarded.
    pub fn run<S: ByteSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let drained = self.consumer.drain(|byte| sink.write_byte(byte));
        self.account(drained)
    }

    /// Like [`run`](Self::run) but stops after `max` bytes.
    pub fn run_budgeted<S: ByteSink + ?Sized>(&mut self, max: usize, sink: &mut S) -> usize {
        let drained = self
            .consumer
            .drain_up_to(max, |byte| sink.write_byte(byte));
        self.account(drained)
    }

    fn account(&mut self, drained: usize) -> usize {
        if drained > 0 {
            self.forwarded += drained as u64;
            trace!(
                drained,
                forwarded = self.forwarded,
                remaining = self.consumer.len(),
                "echo task drained rx ring"
            );
        }
        drained
    }

    /// Total bytes forwarded since the task was created.
    #[inline]
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    /// Returns the ring this task drains.
    #[inline]
    pub fn ring(&self) -> &'a RingBuffer<N, P> {
        self.consumer.ring()
    }
}
