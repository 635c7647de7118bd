//! isr-ring-uart - UART Receive Path on isr-ring
//!
//! Binds an [`isr_ring::RingBuffer`] to a serial port:
//!
//! - [`UartRx`]: receive-interrupt glue, one `on_byte_received` per byte
//! - [`EchoTask`]: main-loop task draining the ring into a [`ByteSink`]
//! - [`Monitor`]: status reader that turns watermark edges into
//!   [`FlowControl`] calls
//!
//! The register interface stays outside: bytes come in through
//! `on_byte_received` and leave through [`ByteSink::write_byte`].
//! [`sim::SimulatedUart`] models the registers for tests and the demo.
//!
//! # Example
//!
//! ```
//! use isr_ring::RingBuffer;
//! use isr_ring_uart::{init, Monitor};
//!
//! static RX: RingBuffer<64> = RingBuffer::new();
//!
//! let (rx, mut echo) = init(&RX).unwrap();
//! let mut monitor = Monitor::new(&RX);
//!
//! // Receive interrupt
//! for byte in *b"hello" {
//!     rx.on_byte_received(byte);
//! }
//!
//! // Main loop
//! let mut tx = Vec::new();
//! echo.run(&mut tx);
//! let status = monitor.poll();
//!
//! assert_eq!(tx, b"hello");
//! assert_eq!(status.level, 0);
//! ```

mod backoff;
mod echo;
mod flow;
mod monitor;
mod rx;
mod sink;

pub mod sim;

pub use backoff::TxBackoff;
pub use echo::EchoTask;
pub use flow::{FlowControl, NoFlowControl};
pub use monitor::Monitor;
pub use rx::UartRx;
pub use sink::{ByteSink, ReadyPollSink};

use isr_ring::{HandleError, OverflowPolicy, RingBuffer};

/// Claims both sides of `ring`: the interrupt glue and the echo task.
///
/// Call once at start-up, before enabling the receive interrupt.
pub fn init<const N: usize, P: OverflowPolicy>(
    ring: &RingBuffer<N, P>,
) -> Result<(UartRx<'_, N, P>, EchoTask<'_, N, P>), HandleError> {
    let (producer, consumer) = ring.split()?;
    Ok((UartRx::new(producer), EchoTask::new(consumer)))
}
