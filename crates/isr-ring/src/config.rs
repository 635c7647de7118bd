use crate::ConfigError;

/// Watermark thresholds for a ring.
///
/// The capacity itself is the const generic `N` of [`RingBuffer`](crate::RingBuffer);
/// only the flow-control thresholds live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingConfig {
    /// Level at or above which the watermark flag is raised.
    pub high_watermark: usize,
    /// Level at or below which a raised flag is cleared.
    pub low_watermark: usize,
}

impl RingConfig {
    /// Creates a configuration with explicit thresholds.
    pub const fn new(high_watermark: usize, low_watermark: usize) -> Self {
        Self {
            high_watermark,
            low_watermark,
        }
    }

    /// 75 % / 25 % thresholds for a ring of `capacity` bytes.
    ///
    /// A one-byte ring gets `high = 1, low = 0` so the preset stays valid.
    pub const fn for_capacity(capacity: usize) -> Self {
        let high = capacity * 3 / 4;
        Self {
            high_watermark: if high == 0 { capacity } else { high },
            low_watermark: capacity / 4,
        }
    }

    /// Sets the high watermark.
    pub const fn with_high_watermark(mut self, high: usize) -> Self {
        self.high_watermark = high;
        self
    }

    /// Sets the low watermark.
    pub const fn with_low_watermark(mut self, low: usize) -> Self {
        self.low_watermark = low;
        self
    }

    /// Checks the thresholds against a ring of `capacity` bytes.
    ///
    /// Requires `low < high <= capacity`.
    pub const fn validate(&self, capacity: usize) -> Result<(), ConfigError> {
        if self.low_watermark >= self.high_watermark {
            return Err(ConfigError::LowNotBelowHigh {
                low: self.low_watermark,
                high: self.high_watermark,
            });
        }
        if self.high_watermark > capacity {
            return Err(ConfigError::HighAboveCapacity {
                high: self.high_watermark,
                capacity,
            });
        }
        Ok(())
    }
}

/// Receive buffer size used by the UART firmware this crate grew out of.
pub const UART_RX_CAPACITY: usize = 64;

/// 64-byte UART receive ring: raise at 48, release at 16.
pub const UART_RX_CONFIG: RingConfig = RingConfig::for_capacity(UART_RX_CAPACITY);
