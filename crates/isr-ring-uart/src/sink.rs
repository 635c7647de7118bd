//! Byte sinks: where the echo task forwards drained bytes.

use crate::TxBackoff;

/// Blocking "accept one byte" collaborator.
///
/// `write_byte` returns once the byte has been handed off. It may block, so it
/// is only ever called from the main loop, never from the interrupt.
pub trait ByteSink {
    /// Hands off one byte, waiting as long as needed.
    fn write_byte(&mut self, byte: u8);
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    #[inline]
    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte);
    }
}

impl ByteSink for Vec<u8> {
    #[inline]
    fn write_byte(&mut self, byte: u8) {
        self.push(byte);
    }
}

/// Sink that polls a transmit-ready flag before writing the data register.
///
/// `ready` plays the TXE status bit, `write` the data register store.
///
/// ```
/// use isr_ring_uart::{ByteSink, ReadyPollSink};
///
/// let mut wire = Vec::new();
/// let mut sink = ReadyPollSink::new(|| true, |byte| wire.push(byte));
/// sink.write_byte(b'x');
/// drop(sink);
/// assert_eq!(wire, b"x");
/// ```
pub struct ReadyPollSink<R, W> {
    ready: R,
    write: W,
    backoff: TxBackoff,
}

impl<R, W> ReadyPollSink<R, W>
where
    R: FnMut() -> bool,
    W: FnMut(u8),
{
    /// Creates a sink from a ready predicate and a register write.
    pub fn new(ready: R, write: W) -> Self {
        Self {
            ready,
            write,
            backoff: TxBackoff::new(),
        }
    }
}

impl<R, W> ByteSink for ReadyPollSink<R, W>
where
    R: FnMut() -> bool,
    W: FnMut(u8),
{
    fn write_byte(&mut self, byte: u8) {
        self.backoff.reset();
        while !(self.ready)() {
            self.backoff.snooze();
        }
        (self.write)(byte);
    }
}
