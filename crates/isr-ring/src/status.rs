use core::fmt;

/// Point-in-time view of a ring, as read by the monitor.
///
/// The fields are loaded one after another, not as a group: with the producer
/// running concurrently `level` can lag the other fields by one push. That is
/// fine for flow control and not meant for exact accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    /// Bytes currently stored.
    pub level: usize,
    /// Bytes dropped or displaced since construction or the last reset.
    pub overflow_count: u32,
    /// Watermark hysteresis flag.
    pub high_watermark_active: bool,
    /// `level * 100 / capacity`, 0..=100.
    pub utilization_percent: u8,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level={} ({}%) overflows={} high_watermark={}",
            self.level,
            self.utilization_percent,
            self.overflow_count,
            if self.high_watermark_active { "active" } else { "clear" }
        )
    }
}
