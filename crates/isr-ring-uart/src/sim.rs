//! Host-side model of a UART peripheral.
//!
//! Enough register behavior to run the receive interrupt, echo task and
//! monitor without hardware: a status register with `RXNE`/`TXE`, a data
//! register, and the receive-interrupt enable bit in `CR1`. The transmitter
//! stays busy for a configurable number of status polls after each write so
//! the ready-polling sink actually waits.

use crate::{ReadyPollSink, UartRx};
use isr_ring::OverflowPolicy;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Mutex;

/// Receive data register not empty.
pub const SR_RXNE: u32 = 1 << 5;
/// Transmit data register empty.
pub const SR_TXE: u32 = 1 << 7;
/// Receive interrupt enable.
pub const CR1_RXNEIE: u32 = 1 << 5;

/// Simulated UART registers plus a log of transmitted bytes.
#[derive(Debug)]
pub struct SimulatedUart {
    sr: AtomicU32,
    cr1: AtomicU32,
    rx_dr: AtomicU8,
    tx_busy_polls: AtomicU32,
    tx_latency: u32,
    overruns: AtomicU32,
    wire: Mutex<Vec<u8>>,
}

impl SimulatedUart {
    /// Creates a UART whose transmitter is busy for `tx_latency` status polls
    /// after each byte.
    pub fn new(tx_latency: u32) -> Self {
        Self {
            sr: AtomicU32::new(SR_TXE),
            cr1: AtomicU32::new(0),
            rx_dr: AtomicU8::new(0),
            tx_busy_polls: AtomicU32::new(0),
            tx_latency,
            overruns: AtomicU32::new(0),
            wire: Mutex::new(Vec::new()),
        }
    }

    /// Sets `RXNEIE`, as done once the receive ring is ready.
    pub fn enable_rx_interrupt(&self) {
        self.cr1.fetch_or(CR1_RXNEIE, Ordering::AcqRel);
    }

    /// Clears `RXNEIE`.
    pub fn disable_rx_interrupt(&self) {
        self.cr1.fetch_and(!CR1_RXNEIE, Ordering::AcqRel);
    }

    /// A byte arrives on the line. Returns `false` if the previous byte was
    /// never read out (a hardware overrun: the old byte is lost).
    pub fn receive(&self, byte: u8) -> bool {
        self.rx_dr.store(byte, Ordering::Release);
        let prev = self.sr.fetch_or(SR_RXNE, Ordering::AcqRel);
        if prev & SR_RXNE != 0 {
            self.overruns.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// The receive interrupt handler: if the interrupt is enabled and a byte
    /// is pending, read the data register (clearing `RXNE`) and hand the byte
    /// to the ring glue. Returns whether a byte was delivered.
    pub fn irq_handler<const N: usize, P: OverflowPolicy>(&self, rx: &UartRx<'_, N, P>) -> bool {
        if self.cr1.load(Ordering::Acquire) & CR1_RXNEIE == 0 {
            return false;
        }
        if self.sr.load(Ordering::Acquire) & SR_RXNE == 0 {
            return false;
        }
        let byte = self.rx_dr.load(Ordering::Acquire);
        self.sr.fetch_and(!SR_RXNE, Ordering::AcqRel);
        rx.on_byte_received(byte);
        true
    }

    /// Reads the status register. Each read counts down the transmitter.
    pub fn status_register(&self) -> u32 {
        let busy = self.tx_busy_polls.load(Ordering::Acquire);
        if busy > 0 {
            self.tx_busy_polls.store(busy - 1, Ordering::Release);
            return self.sr.load(Ordering::Acquire) & !SR_TXE;
        }
        self.sr.load(Ordering::Acquire) | SR_TXE
    }

    /// Returns true when the transmitter can take a byte.
    pub fn tx_ready(&self) -> bool {
        self.status_register() & SR_TXE != 0
    }

    /// Writes the transmit data register.
    pub fn write_dr(&self, byte: u8) {
        self.wire
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(byte);
        self.tx_busy_polls.store(self.tx_latency, Ordering::Release);
    }

    /// Blocking transmit sink over this UART.
    pub fn tx_sink(&self) -> ReadyPollSink<impl FnMut() -> bool + '_, impl FnMut(u8) + '_> {
        ReadyPollSink::new(|| self.tx_ready(), |byte| self.write_dr(byte))
    }

    /// Bytes transmitted so far.
    pub fn transmitted(&self) -> Vec<u8> {
        self.wire
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Bytes lost because the interrupt did not read them in time.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl Default for SimulatedUart {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ByteSink;
    use isr_ring::{DropNewest, RingBuffer};

    #[test]
    fn test_irq_ignored_until_enabled() {
        let ring: RingBuffer<8, DropNewest> = RingBuffer::new();
        let rx = UartRx::attach(&ring).unwrap();
        let uart = SimulatedUart::default();

        assert!(uart.receive(b'a'));
        assert!(!uart.irq_handler(&rx));
        assert!(ring.is_empty());

        uart.enable_rx_interrupt();
        assert!(uart.irq_handler(&rx));
        assert!(!uart.irq_handler(&rx), "RXNE cleared by the data register read");
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_overrun_when_not_serviced() {
        let uart = SimulatedUart::default();
        assert!(uart.receive(1));
        assert!(!uart.receive(2));
        assert_eq!(uart.overruns(), 1);
    }

    #[test]
    fn test_tx_sink_waits_out_latency() {
        let uart = SimulatedUart::new(3);
        {
            let mut sink = uart.tx_sink();
            sink.write_byte(b'o');
            sink.write_byte(b'k');
        }
        assert_eq!(uart.transmitted(), b"ok");
        // Busy again after the last byte.
        assert!(!uart.tx_ready());
    }

    #[test]
    fn test_disable_rx_interrupt() {
        let ring: RingBuffer<8, DropNewest> = RingBuffer::new();
        let rx = UartRx::attach(&ring).unwrap();
        let uart = SimulatedUart::default();
        uart.enable_rx_interrupt();
        uart.disable_rx_interrupt();
        uart.receive(7);
        assert!(!uart.irq_handler(&rx));
    }
}
