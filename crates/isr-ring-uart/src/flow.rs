/// Local flow-control hook driven by the watermark flag.
///
/// Typically toggles an RTS/ready line. Called only by [`Monitor`](crate::Monitor),
/// once per edge of the flag.
pub trait FlowControl {
    /// The ring crossed the high watermark: ask the sender to pause.
    fn assert_backpressure(&mut self);

    /// The ring fell to the low watermark: let the sender resume.
    fn release_backpressure(&mut self);
}

/// Flow control that does nothing; the flag is only observed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFlowControl;

impl FlowControl for NoFlowControl {
    #[inline]
    fn assert_backpressure(&mut self) {}

    #[inline]
    fn release_backpressure(&mut self) {}
}

impl<F: FlowControl + ?Sized> FlowControl for &mut F {
    fn assert_backpressure(&mut self) {
        (**self).assert_backpressure();
    }

    fn release_backpressure(&mut self) {
        (**self).release_backpressure();
    }
}
