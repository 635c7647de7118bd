use isr_ring::{DefaultPolicy, OverflowPolicy, Producer, RingBuffer};

/// Receive-interrupt glue: one call per received byte.
///
/// Owns the ring's producer handle. Nothing here blocks, allocates or logs;
/// an overflow is already counted by the ring and resolved by its policy, so
/// the push result is deliberately dropped.
#[derive(Debug)]
pub struct UartRx<'a, const N: usize, P: OverflowPolicy = DefaultPolicy> {
    producer: Producer<'a, N, P>,
}

impl<'a, const N: usize, P: OverflowPolicy> UartRx<'a, N, P> {
    /// Wraps a claimed producer handle.
    pub fn new(producer: Producer<'a, N, P>) -> Self {
        Self { producer }
    }

    /// Claims the producer side of `ring`.
    pub fn attach(ring: &'a RingBuffer<N, P>) -> Result<Self, isr_ring::HandleError> {
        ring.producer().map(Self::new)
    }

    /// Call from the receive interrupt with the byte read from the data register.
    #[inline]
    pub fn on_byte_received(&self, byte: u8) {
        let _ = self.producer.push(byte);
    }

    /// Returns the ring this glue feeds.
    #[inline]
    pub fn ring(&self) -> &'a RingBuffer<N, P> {
        self.producer.ring()
    }
}
