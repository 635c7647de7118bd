use crate::{FlowControl, NoFlowControl};
use isr_ring::{DefaultPolicy, OverflowPolicy, RingBuffer, Status};
use tracing::{info, warn};

/// Watermark monitor: the one place that acts on the high-watermark flag.
///
/// Reads [`RingBuffer::status`] and never mutates the ring, so it needs no
/// handle and can run next to the echo task or on a slower cadence. The flag
/// is edge-detected here as well: flow control is asserted once when it rises
/// and released once when it falls, however often `poll` runs in between.
#[derive(Debug)]
pub struct Monitor<
    'a,
    const N: usize,
    P: OverflowPolicy = DefaultPolicy,
    F: FlowControl = NoFlowControl,
> {
    ring: &'a RingBuffer<N, P>,
    flow: F,
    backpressure: bool,
    seen_overflows: u32,
}

impl<'a, const N: usize, P: OverflowPolicy> Monitor<'a, N, P> {
    /// Monitor that only logs.
    pub fn new(ring: &'a RingBuffer<N, P>) -> Self {
        Self::with_flow_control(ring, NoFlowControl)
    }
}

impl<'a, const N: usize, P: OverflowPolicy, F: FlowControl> Monitor<'a, N, P, F> {
    /// Monitor that drives `flow` from the watermark flag.
    pub fn with_flow_control(ring: &'a RingBuffer<N, P>, flow: F) -> Self {
        Self {
            ring,
            flow,
            backpressure: false,
            seen_overflows: ring.overflow_count(),
        }
    }

    /// Takes a status snapshot and applies any flag edge to flow control.
    pub fn poll(&mut self) -> Status {
        let status = self.ring.status();

        if status.overflow_count != self.seen_overflows {
            warn!(
                lost = status.overflow_count.wrapping_sub(self.seen_overflows),
                total = status.overflow_count,
                policy = self.ring.policy_name(),
                "rx ring overflowed"
            );
            self.seen_overflows = status.overflow_count;
        }

        match (status.high_watermark_active, self.backpressure) {
            (true, false) => {
                warn!(
                    level = status.level,
                    utilization = status.utilization_percent,
                    "rx ring above high watermark, asserting backpressure"
                );
                self.flow.assert_backpressure();
                self.backpressure = true;
            }
            (false, true) => {
                info!(
                    level = status.level,
                    utilization = status.utilization_percent,
                    "rx ring at low watermark, releasing backpressure"
                );
                self.flow.release_backpressure();
                self.backpressure = false;
            }
            _ => {}
        }

        status
    }

    /// Returns true while flow control is asserted.
    #[inline]
    pub fn is_backpressure_asserted(&self) -> bool {
        self.backpressure
    }

    /// Returns the flow-control hook.
    #[inline]
    pub fn flow_control(&self) -> &F {
        &self.flow
    }

    /// Consumes the monitor, returning the flow-control hook.
    pub fn into_flow_control(self) -> F {
        self.flow
    }
}
